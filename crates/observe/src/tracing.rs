use {
    crate::config::Config,
    std::{io::IsTerminal, panic::PanicHookInfo},
    time::macros::format_description,
    tracing::{Level, Subscriber, level_filters::LevelFilter},
    tracing_subscriber::{
        EnvFilter,
        Layer,
        Registry,
        fmt::{MakeWriter, time::UtcTime, writer::MakeWriterExt as _},
        layer::Layered,
        prelude::*,
        util::SubscriberInitExt,
    },
};

type Base = Layered<LevelFilter, Registry>;

/// Initializes tracing setup that is shared between the binaries.
/// `env_filter` has similar syntax to env_logger. It is documented at
/// https://docs.rs/tracing-subscriber/latest/tracing_subscriber/filter/struct.EnvFilter.html
pub fn initialize(config: &Config) {
    let stderr_threshold = config.stderr_threshold.unwrap_or(Level::ERROR);
    let writer = std::io::stdout
        .with_min_level(stderr_threshold)
        .or_else(std::io::stderr);
    subscriber(config, writer, std::io::stdout().is_terminal()).init();
    std::panic::set_hook(Box::new(tracing_panic_hook));
    tracing::info!(filter = %config.env_filter, "initialized tracing");
}

/// Builds the subscriber [`initialize`] installs, writing formatted events to
/// `make_writer`.
pub fn subscriber<W>(
    config: &Config,
    make_writer: W,
    ansi: bool,
) -> impl Subscriber + Send + Sync + 'static + use<W>
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let timer = UtcTime::new(format_description!(
        "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]Z"
    ));
    let fmt_layer: Box<dyn Layer<Base> + Send + Sync> = if config.use_json_format {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(make_writer)
            .with_timer(timer)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_writer(make_writer)
            .with_timer(timer)
            .with_ansi(ansi)
            .boxed()
    };

    tracing_subscriber::registry()
        // Without this the subscriber ignores the next log after an `tracing::event!()` which
        // `sqlx` uses under the hood.
        .with(LevelFilter::TRACE)
        .with(fmt_layer.with_filter(EnvFilter::new(&config.env_filter)))
}

/// Panic hook that prints roughly the same message as the default panic hook
/// but uses tracing:error instead of stderr.
///
/// Useful when we want panic messages to have the proper log format.
fn tracing_panic_hook(panic: &PanicHookInfo) {
    let thread = std::thread::current();
    let name = thread.name().unwrap_or("<unnamed>");
    let backtrace = std::backtrace::Backtrace::force_capture();
    tracing::error!("thread '{name}' {panic}\nstack backtrace:\n{backtrace}");
}
