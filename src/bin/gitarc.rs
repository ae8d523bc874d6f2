//! `gitarc` command-line interface.

use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

use clap::Parser;

use gitarc::attrs::AttrRules;
use gitarc::convert::Identity;
use gitarc::subst::PlaceholderFormatter;
use gitarc::{
    formats, lookup_format, new_writer, ArchiveRequest, Error, ObjectStore, PathFilter,
    Result, SubmodulePolicy, WriterOptions,
};

#[derive(Parser, Debug)]
#[command(
    name = "gitarc",
    version,
    about = "Export a git tree snapshot as a tar, tar.gz, or zip archive"
)]
struct Cli {
    /// Archive format
    #[arg(long, default_value = "tar", value_name = "fmt")]
    format: String,

    /// Prepend prefix to each pathname in the archive
    #[arg(long, default_value = "", value_name = "prefix")]
    prefix: String,

    /// Write the archive to this file instead of stdout
    #[arg(long, short = 'o', value_name = "file")]
    output: Option<PathBuf>,

    /// Include submodule content in the archive (none, checkedout, all)
    #[arg(
        long,
        value_name = "kind",
        num_args = 0..=1,
        default_missing_value = "checkedout"
    )]
    submodules: Option<String>,

    /// Report each archived path on stderr
    #[arg(short, long)]
    verbose: bool,

    /// Compression level (0-9, formats with compression only)
    #[arg(
        long = "compression-level",
        short = 'l',
        value_name = "level",
        value_parser = clap::value_parser!(u32).range(0..=9)
    )]
    compression_level: Option<u32>,

    /// List supported archive formats and exit
    #[arg(long)]
    list: bool,

    /// Repository to archive
    #[arg(short = 'C', long = "directory", default_value = ".", value_name = "dir")]
    directory: PathBuf,

    /// Retrieve the archive from a remote repository (unsupported)
    #[arg(long, value_name = "repo", hide = true)]
    remote: Option<String>,

    /// Path to the remote archive command (unsupported)
    #[arg(long, value_name = "cmd", hide = true)]
    exec: Option<String>,

    /// Tree-ish to archive
    #[arg(value_name = "tree-ish")]
    tree_ish: Option<String>,

    /// Restrict the archive to these paths
    #[arg(value_name = "path")]
    paths: Vec<String>,
}

fn main() {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(if cli.verbose {
            log::LevelFilter::Info
        } else {
            log::LevelFilter::Warn
        })
        .format_target(false)
        .init();

    if let Err(err) = run(cli) {
        eprintln!("gitarc: {}", err);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    if cli.list {
        let mut stdout = std::io::stdout().lock();
        for format in formats() {
            writeln!(stdout, "{}", format.name)?;
        }
        return Ok(());
    }

    // All option validation happens before the output file is created or
    // truncated.
    if cli.remote.is_some() {
        return Err(Error::unsupported_option(
            "remote repository operation is not supported",
        ));
    }
    if cli.exec.is_some() {
        return Err(Error::unsupported_option(
            "--exec can only be used together with --remote",
        ));
    }

    let format = lookup_format(&cli.format)
        .ok_or_else(|| Error::UnknownFormat(cli.format.clone()))?;
    if cli.compression_level.is_some() && !format.compression {
        return Err(Error::unsupported_option(format!(
            "compression level not supported for format '{}'",
            format.name
        )));
    }

    let submodules = match cli.submodules.as_deref() {
        None => SubmodulePolicy::None,
        Some(kind) => SubmodulePolicy::parse(kind).ok_or_else(|| {
            Error::unsupported_option(format!("invalid submodule kind: {}", kind))
        })?,
    };

    let tree_ish = cli
        .tree_ish
        .as_deref()
        .ok_or_else(|| Error::unsupported_option("a <tree-ish> argument is required"))?;

    let store = ObjectStore::discover(&cli.directory)?;
    let source = store.resolve_treeish(tree_ish)?;
    let attrs = AttrRules::from_tree(&store, source.tree);

    let out: Box<dyn Write> = match &cli.output {
        Some(path) => Box::new(File::create(path).map_err(|e| Error::io(path, e))?),
        None => Box::new(std::io::stdout().lock()),
    };
    let mut writer = new_writer(
        format,
        out,
        WriterOptions {
            compression_level: cli.compression_level,
            mtime: source.time,
        },
    )?;

    let mut request = ArchiveRequest::from_source(&source);
    request.prefix = cli.prefix;
    request.paths = PathFilter::new(&cli.paths)?;
    request.submodules = submodules;
    request.verbose = cli.verbose;

    gitarc::write_archive(
        &store,
        &request,
        &attrs,
        &Identity,
        &PlaceholderFormatter,
        writer.as_mut(),
    )
}
