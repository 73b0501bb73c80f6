use env_logger::WriteStyle;
use log::LevelFilter;
use std::io::Write;

/// Installs the crate's default logger for demos and tests.
///
/// The library itself only emits through the `log` facade; hosts with their
/// own logger should skip this.
pub fn try_init() -> Result<(), log::SetLoggerError> {
    env_logger::builder()
        .format(|buf, record| writeln!(buf, "[DSIM | {}] {}", record.level(), record.args()))
        .write_style(WriteStyle::Always)
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .try_init()
}
