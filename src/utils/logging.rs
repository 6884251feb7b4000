use crate::config::LoggingConfig;
use log::{info, LevelFilter};
use log4rs::{
    append::{
        console::ConsoleAppender,
        rolling_file::{
            policy::compound::{
                roll::fixed_window::FixedWindowRoller, trigger::size::SizeTrigger, CompoundPolicy,
            },
            RollingFileAppender,
        },
    },
    config::{Appender, Logger, Root},
    encode::pattern::PatternEncoder,
    init_config, Config,
};
use std::net::IpAddr;

/// The pattern to use when logging
const LOGGING_PATTERN: &str = "[{d} {h({l})} {M}] {m}{n}";
/// Max logging file size before rolling over to the next log file. (5mb)
const LOGGING_MAX_SIZE: u64 = 1024 * 1024 * 5;
/// The max number of logging files to keep before deleting
const LOGGING_MAX_FILES: u32 = 8;
/// The module the configured logging level applies to
const LOGGING_MODULE: &str = "leaderboard_relay";

/// Setup function for setting up the Log4rs logging configuring it
/// for the application module and setting up file and stdout logging
pub fn setup(config: &LoggingConfig) {
    if config.level == LevelFilter::Off {
        // Don't initialize logger at all if logging is disabled
        return;
    }

    let pattern = Box::new(PatternEncoder::new(LOGGING_PATTERN));
    let size_trigger = SizeTrigger::new(LOGGING_MAX_SIZE);

    let file_pattern = format!("{}/log-{{}}.log", &config.dir);
    let latest_path = format!("{}/log.log", &config.dir);

    let fixed_window_roller = FixedWindowRoller::builder()
        .build(&file_pattern, LOGGING_MAX_FILES)
        .expect("Unable to create fixed window log roller");

    let compound_policy =
        CompoundPolicy::new(Box::new(size_trigger), Box::new(fixed_window_roller));

    let stdout_appender = ConsoleAppender::builder().encoder(pattern.clone()).build();

    let file_appender = RollingFileAppender::builder()
        .encoder(pattern)
        .build(latest_path, Box::new(compound_policy))
        .expect("Unable to create logging file appender");

    const APPENDERS: [&str; 2] = ["stdout", "file"];

    let log_config = Config::builder()
        .appender(Appender::builder().build("stdout", Box::new(stdout_appender)))
        .appender(Appender::builder().build("file", Box::new(file_appender)))
        .logger(
            Logger::builder()
                .appenders(APPENDERS)
                .additive(false)
                .build(LOGGING_MODULE, config.level),
        )
        .build(
            Root::builder()
                .appenders(APPENDERS)
                .build(LevelFilter::Warn),
        )
        .expect("Failed to create logging config");

    init_config(log_config).expect("Unable to initialize logger");

    // Include panics in the log output
    log_panics::init();
}

/// Prints a list of possible urls that can be used to reach the
/// leaderboard from this server
///
/// `host` The address the server is bound to
/// `port` The port the server is bound to
pub fn log_connection_urls(host: IpAddr, port: u16) {
    let mut output = String::new();

    // Servers bound to a specific address are only reachable through it
    if !host.is_unspecified() {
        info!("Connection URLS (http://{host}:{port}/leaderboard)");
        return;
    }

    if let Ok(local_address) = local_ip_address::local_ip() {
        output.push_str(&format!("LAN: http://{local_address}:{port}, "));
    }

    output.push_str(&format!("LOCAL: http://127.0.0.1:{port}"));

    info!("Connection URLS ({output})");
}
