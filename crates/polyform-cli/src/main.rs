use std::io::{self, Read, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Debug, Parser)]
#[command(
    name = "polyform",
    version,
    about = "Validate, format, minify and convert JSON/TOML/YAML/XML; decode and verify JWTs"
)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Convert between formats
    Convert {
        /// Input file (defaults to stdin)
        #[arg(value_name = "INPUT")]
        input: Option<PathBuf>,
        /// Input format (inferred from the file extension when omitted)
        #[arg(short, long, value_enum)]
        from: Option<FormatArg>,
        /// Output format
        #[arg(short, long, value_enum)]
        to: FormatArg,
        /// Output file (defaults to stdout)
        #[arg(short, long, value_name = "OUTPUT")]
        output: Option<PathBuf>,
    },
    /// Pretty-print input in its own format
    Fmt {
        #[arg(value_name = "INPUT")]
        input: Option<PathBuf>,
        #[arg(short, long, value_enum)]
        format: Option<FormatArg>,
        #[arg(short, long, value_name = "OUTPUT")]
        output: Option<PathBuf>,
    },
    /// Strip insignificant whitespace (JSON and XML only)
    Minify {
        #[arg(value_name = "INPUT")]
        input: Option<PathBuf>,
        #[arg(short, long, value_enum)]
        format: Option<FormatArg>,
        #[arg(short, long, value_name = "OUTPUT")]
        output: Option<PathBuf>,
    },
    /// Check that input parses; exits non-zero when it does not
    Validate {
        #[arg(value_name = "INPUT")]
        input: Option<PathBuf>,
        #[arg(short, long, value_enum)]
        format: Option<FormatArg>,
    },
    /// Decode or verify a JWT
    Jwt {
        #[command(subcommand)]
        command: JwtCommand,
    },
}

#[derive(Debug, Subcommand)]
enum JwtCommand {
    /// Decode a token's header and payload without verification
    Decode {
        /// Token (defaults to stdin)
        token: Option<String>,
    },
    /// Verify a token's HS256 signature
    Verify {
        /// Token (defaults to stdin)
        token: Option<String>,
        /// Shared secret
        #[arg(short, long)]
        secret: String,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FormatArg {
    Json,
    Toml,
    #[value(alias = "yml")]
    Yaml,
    Xml,
}

impl From<FormatArg> for polyform::Format {
    fn from(value: FormatArg) -> Self {
        match value {
            FormatArg::Json => Self::Json,
            FormatArg::Toml => Self::Toml,
            FormatArg::Yaml => Self::Yaml,
            FormatArg::Xml => Self::Xml,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    match args.command {
        Command::Convert {
            input,
            from,
            to,
            output,
        } => {
            let data = read_input(&input)?;
            let from = resolve_format(from, &input)?;
            let converted = polyform::convert(&data, from, to.into())?;
            write_output(&output, converted.as_bytes())
        }
        Command::Fmt {
            input,
            format,
            output,
        } => {
            let data = read_input(&input)?;
            let format = resolve_format(format, &input)?;
            let formatted = polyform::format_text(&data, format)?;
            write_output(&output, formatted.as_bytes())
        }
        Command::Minify {
            input,
            format,
            output,
        } => {
            let data = read_input(&input)?;
            let format = resolve_format(format, &input)?;
            let minified = polyform::minify(&data, format)?;
            write_output(&output, minified.as_bytes())
        }
        Command::Validate { input, format } => {
            let data = read_input(&input)?;
            let format = resolve_format(format, &input)?;
            if polyform::validate(&data, format) {
                println!("valid {format}");
                Ok(())
            } else {
                bail!("input is not valid {format}");
            }
        }
        Command::Jwt { command } => run_jwt(command),
    }
}

fn run_jwt(command: JwtCommand) -> Result<()> {
    match command {
        JwtCommand::Decode { token } => {
            let token = read_token(token)?;
            let decoded = polyform::jwt::decode(&token)?;
            let header = polyform::format_text(
                &polyform::convert::serialize(&decoded.header, polyform::Format::Json)?,
                polyform::Format::Json,
            )?;
            let payload = polyform::format_text(
                &polyform::convert::serialize(&decoded.payload, polyform::Format::Json)?,
                polyform::Format::Json,
            )?;
            println!("{header}\n{payload}");
            Ok(())
        }
        JwtCommand::Verify { token, secret } => {
            let token = read_token(token)?;
            if polyform::jwt::verify(&token, secret.as_bytes())? {
                println!("signature valid");
                Ok(())
            } else {
                bail!("signature invalid");
            }
        }
    }
}

fn resolve_format(explicit: Option<FormatArg>, path: &Option<PathBuf>) -> Result<polyform::Format> {
    if let Some(format) = explicit {
        return Ok(format.into());
    }
    let inferred = path
        .as_ref()
        .and_then(|p| p.to_str())
        .and_then(polyform::detect_format_from_path);
    match inferred {
        Some(format) => Ok(format),
        None => {
            bail!("could not infer format; pass --from/--format or use a file with an extension")
        }
    }
}

fn read_input(path: &Option<PathBuf>) -> Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read input file {}", path.display())),
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("failed to read stdin")?;
            if buffer.trim().is_empty() {
                bail!("no input provided on stdin");
            }
            Ok(buffer)
        }
    }
}

fn read_token(token: Option<String>) -> Result<String> {
    match token {
        Some(token) => Ok(token),
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("failed to read stdin")?;
            if buffer.trim().is_empty() {
                bail!("no token provided on stdin");
            }
            Ok(buffer.trim().to_string())
        }
    }
}

fn write_output(path: &Option<PathBuf>, data: &[u8]) -> Result<()> {
    match path {
        Some(path) => std::fs::write(path, data)
            .with_context(|| format!("failed to write output file {}", path.display())),
        None => {
            let mut stdout = io::stdout();
            stdout.write_all(data).context("failed to write stdout")?;
            stdout.write_all(b"\n").context("failed to write stdout")?;
            Ok(())
        }
    }
}
