//! Logger setup.
//!
//! Level precedence: `-v` flags, then the config `[log] level`, then `RUST_LOG`,
//! then warnings only. Records go to stderr so JSON on stdout stays parseable.

use std::io::Write;

use log::LevelFilter;

use crate::app::AppContext;

pub fn init(ctx: &AppContext) {
    let cli = ctx.cli();
    let explicit = match cli.verbose {
        0 => None,
        1 => Some(LevelFilter::Info),
        2 => Some(LevelFilter::Debug),
        _ => Some(LevelFilter::Trace),
    };
    // A broken config surfaces later with a proper error; logging just falls back.
    let configured = ctx
        .config()
        .ok()
        .flatten()
        .and_then(|c| c.log.level.as_deref())
        .and_then(parse_level);

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    builder.format(|buf, record| {
        writeln!(
            buf,
            "{}: {} - {}",
            record.level(),
            record.target(),
            record.args()
        )
    });
    if let Some(level) = explicit.or(configured) {
        builder.filter_level(level);
    }
    if cli.quiet && explicit.is_none() {
        builder.filter_level(LevelFilter::Error);
    }

    let _ = builder.try_init();
}

fn parse_level(level: &str) -> Option<LevelFilter> {
    let level = level.trim();
    if level.eq_ignore_ascii_case("warning") {
        return Some(LevelFilter::Warn);
    }
    level.parse().ok()
}
