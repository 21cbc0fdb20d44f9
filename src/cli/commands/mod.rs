use clap::{
    builder::{
        styling::{AnsiColor, Effects, Styles},
        ValueParser,
    },
    Arg, ArgAction, ColorChoice, Command,
};

pub const ARG_VERBOSITY: &str = "verbosity";

pub fn validator_log_level() -> ValueParser {
    ValueParser::from(move |level: &str| -> std::result::Result<u8, String> {
        if let Ok(parsed) = level.parse::<u8>() {
            // Successfully parsed as a number
            if parsed <= 5 {
                return Ok(parsed);
            }
        }

        match level.to_lowercase().as_str() {
            "error" => Ok(0),
            "warn" => Ok(1),
            "info" => Ok(2),
            "debug" => Ok(3),
            "trace" => Ok(4),
            _ => Err("invalid log level".to_string()),
        }
    })
}

fn dsn_arg() -> Arg {
    Arg::new("dsn")
        .short('d')
        .long("dsn")
        .help("Postgres connection string, the in-memory store is used when absent")
        .env("RECIPES_DSN")
}

fn jwt_secret_arg() -> Arg {
    Arg::new("jwt-secret")
        .long("jwt-secret")
        .help("Secret used to sign and verify bearer tokens")
        .env("RECIPES_JWT_SECRET")
        .hide_env_values(true)
        .required(true)
}

pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    Command::new("recipes")
        .about("Recipe catalog API")
        .version(env!("CARGO_PKG_VERSION"))
        .color(ColorChoice::Auto)
        .styles(styles)
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("server")
                .about("Serve the recipes API")
                .arg(
                    Arg::new("port")
                        .short('p')
                        .long("port")
                        .help("Port to listen on")
                        .default_value("8080")
                        .env("RECIPES_PORT")
                        .value_parser(clap::value_parser!(u16)),
                )
                .arg(dsn_arg())
                .arg(jwt_secret_arg())
                .arg(
                    Arg::new("session-ttl")
                        .long("session-ttl")
                        .help("Session lifetime in seconds")
                        .default_value("43200")
                        .env("RECIPES_SESSION_TTL")
                        .value_parser(clap::value_parser!(i64).range(1..)),
                )
                .arg(
                    Arg::new("secure-cookies")
                        .long("secure-cookies")
                        .help("Mark the session cookie as Secure (HTTPS only)")
                        .env("RECIPES_SECURE_COOKIES")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("seed")
                        .long("seed")
                        .help("JSON file with recipes to import when the store is empty")
                        .env("RECIPES_SEED"),
                )
                .arg(
                    Arg::new("users")
                        .long("users")
                        .help("JSON file of {username, password} entries to create at startup")
                        .env("RECIPES_USERS"),
                )
                .arg(
                    Arg::new("otlp")
                        .long("otlp")
                        .help("Export traces over OTLP/gRPC (OTEL_EXPORTER_OTLP_ENDPOINT)")
                        .env("RECIPES_OTLP")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("useradd")
                .about("Create a user allowed to sign in")
                .arg(dsn_arg().required(true))
                .arg(
                    Arg::new("username")
                        .short('u')
                        .long("username")
                        .help("Username")
                        .required(true),
                )
                .arg(
                    Arg::new("password")
                        .long("password")
                        .help("Plain text password, hashed with Argon2 before storage")
                        .env("RECIPES_USER_PASSWORD")
                        .hide_env_values(true)
                        .required(true),
                ),
        )
        .subcommand(
            Command::new("token")
                .about("Print a signed bearer token")
                .arg(jwt_secret_arg())
                .arg(
                    Arg::new("username")
                        .short('u')
                        .long("username")
                        .help("Username embedded in the token claims")
                        .required(true),
                )
                .arg(
                    Arg::new("ttl")
                        .long("ttl")
                        .help("Token lifetime in seconds")
                        .default_value("300")
                        .value_parser(clap::value_parser!(i64).range(1..)),
                ),
        )
        .arg(
            Arg::new(ARG_VERBOSITY)
                .short('v')
                .long("verbose")
                .help("Verbosity level: ERROR, WARN, INFO, DEBUG, TRACE (default: ERROR)")
                .env("RECIPES_LOG_LEVEL")
                .global(true)
                .action(ArgAction::Count)
                .value_parser(validator_log_level()),
        )
}
