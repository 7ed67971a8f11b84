mod progress;
mod server;

use std::fs::{self, File};
use std::io::Read;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{ArgAction, Args, Parser, Subcommand};
use color_eyre::eyre::{bail, eyre, WrapErr};
use console::style;
use huffpack::huff0::CodeTable;
use huffpack::{Container, EncodeOptions};
use tracing::info;
use tracing_indicatif::IndicatifLayer;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::progress::{ratio, run_codec, Operation, ProgressMonitor};
use crate::server::{Server, ServerConfig};

#[derive(Parser)]
#[command(version, about = "Static Huffman compression of whole files")]
struct Cli {
    /// More log output, repeat for more detail
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compress a file into a container
    Compress {
        input: PathBuf,
        /// Defaults to the input path with `.huff` appended
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Leave out the content checksum
        #[arg(long)]
        no_checksum: bool,
        /// Overwrite the output if it exists
        #[arg(short, long)]
        force: bool,
    },
    /// Restore the original file from a container
    Decompress {
        input: PathBuf,
        /// Defaults to the input path without its `.huff` extension
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Overwrite the output if it exists
        #[arg(short, long)]
        force: bool,
    },
    /// Print the header and code table of a container
    Inspect { input: PathBuf },
    /// Serve `/compress` and `/decompress` over HTTP
    Serve(ServeArgs),
}

#[derive(Args)]
struct ServeArgs {
    #[arg(long, env = "HUFFPACK_LISTEN", default_value = "0.0.0.0:18080")]
    listen: SocketAddr,
    /// Largest accepted upload in bytes
    #[arg(long, env = "HUFFPACK_MAX_UPLOAD", default_value_t = 64 * 1024 * 1024)]
    max_upload: usize,
    /// Seconds to wait for request data before giving up on a connection
    #[arg(long, env = "HUFFPACK_READ_TIMEOUT", default_value_t = 30)]
    read_timeout: u64,
    /// Connections served at the same time, more are answered with 503
    #[arg(long, env = "HUFFPACK_MAX_CONNECTIONS", default_value_t = 64)]
    max_connections: usize,
}

impl From<ServeArgs> for ServerConfig {
    fn from(args: ServeArgs) -> Self {
        ServerConfig {
            listen: args.listen,
            max_upload: args.max_upload,
            read_timeout: Duration::from_secs(args.read_timeout),
            max_connections: args.max_connections,
        }
    }
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Compress {
            input,
            output,
            no_checksum,
            force,
        } => {
            let output = output.unwrap_or_else(|| append_extension(&input));
            compress(&input, &output, !no_checksum, force)
        }
        Command::Decompress {
            input,
            output,
            force,
        } => {
            let output = match output {
                Some(output) => output,
                None => strip_extension(&input).ok_or_else(|| {
                    eyre!(
                        "{} has no .huff extension, pass --output",
                        input.display()
                    )
                })?,
            };
            decompress(&input, &output, force)
        }
        Command::Inspect { input } => inspect(&input),
        Command::Serve(args) => {
            Server::bind(args.into())?.run()?;
            Ok(())
        }
    }
}

fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    let indicatif_layer = IndicatifLayer::new();
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(indicatif_layer.get_stderr_writer()))
        .with(indicatif_layer)
        .with(level)
        .init();
}

fn compress(input: &Path, output: &Path, checksum: bool, force: bool) -> color_eyre::Result<()> {
    let data = read_input(input)?;
    let (encoded, report) = run_codec(Operation::Compress, &data, |data| {
        huffpack::encoding::compress_with(data, EncodeOptions { checksum })
    })?;
    info!("{report}");
    write_output(output, &encoded, force)
}

fn decompress(input: &Path, output: &Path, force: bool) -> color_eyre::Result<()> {
    let data = read_input(input)?;
    let (decoded, report) = run_codec(Operation::Decompress, &data, huffpack::decode)
        .wrap_err_with(|| format!("failed to decode {}", input.display()))?;
    info!("{report}");
    write_output(output, &decoded, force)
}

fn inspect(input: &Path) -> color_eyre::Result<()> {
    let data = read_input(input)?;
    let container = Container::parse(&data)
        .wrap_err_with(|| format!("failed to parse {}", input.display()))?;
    let header = container.header();

    println!("{}", style(input.display()).bold());
    println!("  version:         {}", header.version);
    println!("  original length: {}", header.original_len);
    println!(
        "  length field:    {} bytes",
        header.descriptor.length_bytes()
    );
    match container.checksum() {
        Some(checksum) => println!("  checksum:        {checksum:#010x}"),
        None => println!("  checksum:        {}", style("none").dim()),
    }
    println!("  payload:         {} bytes", container.payload().len());
    println!(
        "  container size:  {} bytes ({:.1}% of original)",
        data.len(),
        ratio(data.len(), header.original_len as usize)
    );

    let Some(tree) = &header.tree else {
        return Ok(());
    };
    println!(
        "  tree:            {} leaves, depth {}",
        tree.leaf_count(),
        tree.depth()
    );

    let table = CodeTable::from_tree(tree)?;
    let mut codes: Vec<_> = table.iter().collect();
    codes.sort_by_key(|(symbol, code)| (code.len, *symbol));
    println!("{}", style("  symbol  len  code").bold());
    for (symbol, code) in codes {
        println!("  {:<6}  {:>3}  {}", printable(symbol), code.len, code);
    }
    Ok(())
}

fn read_input(path: &Path) -> color_eyre::Result<Vec<u8>> {
    let file =
        File::open(path).wrap_err_with(|| format!("failed to open {}", path.display()))?;
    let size = file.metadata()?.len() as usize;
    let mut monitor = ProgressMonitor::new(file, size, &format!("reading {}", path.display()));
    let mut data = Vec::with_capacity(size);
    monitor
        .read_to_end(&mut data)
        .wrap_err_with(|| format!("failed to read {}", path.display()))?;
    Ok(data)
}

fn write_output(path: &Path, data: &[u8], force: bool) -> color_eyre::Result<()> {
    if !force && path.exists() {
        bail!("{} already exists, pass --force to overwrite", path.display());
    }
    fs::write(path, data).wrap_err_with(|| format!("failed to write {}", path.display()))?;
    info!("wrote {}", path.display());
    Ok(())
}

fn append_extension(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".huff");
    PathBuf::from(name)
}

fn strip_extension(path: &Path) -> Option<PathBuf> {
    (path.extension()? == "huff").then(|| path.with_extension(""))
}

fn printable(symbol: u8) -> String {
    if symbol.is_ascii_graphic() {
        format!("'{}'", symbol as char)
    } else {
        format!("0x{symbol:02x}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_paths() {
        assert_eq!(
            append_extension(Path::new("dir/file.txt")),
            PathBuf::from("dir/file.txt.huff")
        );
        assert_eq!(
            strip_extension(Path::new("dir/file.txt.huff")),
            Some(PathBuf::from("dir/file.txt"))
        );
        assert_eq!(strip_extension(Path::new("file.txt")), None);
        assert_eq!(strip_extension(Path::new("file")), None);
    }

    #[test]
    fn cli_parses() {
        let cli = Cli::try_parse_from(["huffpack", "-vv", "compress", "in.txt", "--no-checksum"])
            .unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(matches!(
            cli.command,
            Command::Compress {
                no_checksum: true,
                force: false,
                output: None,
                ..
            }
        ));

        let cli = Cli::try_parse_from(["huffpack", "serve", "--listen", "127.0.0.1:9000"]).unwrap();
        let Command::Serve(args) = cli.command else {
            panic!("expected serve");
        };
        let config = ServerConfig::from(args);
        assert_eq!(config.listen, "127.0.0.1:9000".parse().unwrap());
        assert_eq!(config.max_upload, 64 * 1024 * 1024);
        assert_eq!(config.max_connections, 64);
    }

    #[test]
    fn printable_symbols() {
        assert_eq!(printable(b'a'), "'a'");
        assert_eq!(printable(b' '), "0x20");
        assert_eq!(printable(0), "0x00");
    }
}
