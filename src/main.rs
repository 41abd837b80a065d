// SPDX-License-Identifier: MPL-2.0
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use tscat::config;
use tscat::error::Result;
use tscat::i18n::CatalogStore;

const LOG_ENV: &str = "TSCAT_LOG";

const HELP: &str = "\
tscat - look up translated UI strings in Qt Linguist catalogs

USAGE:
  tscat [OPTIONS] [SOURCE_TEXT]

OPTIONS:
  --lang TAG              Locale to load (default: settings, then OS locale)
  --dir DIR               Extra catalog directory, may be repeated
  --prefix NAME           Catalog file name prefix (e.g. dde-desktop)
  --config-dir DIR        Directory holding settings.toml
  --context CTX           Context of SOURCE_TEXT
  --disambiguation TEXT   Disambiguation comment of SOURCE_TEXT
  --count N               Select the plural form for N and substitute %n
  --list-locales          Print every locale with a catalog
  --stats                 Print a summary of the loaded catalog
  --compile OUT           Write the loaded catalog in compiled form
  -h, --help              Print this help
";

struct Args {
    lang: Option<String>,
    dirs: Vec<PathBuf>,
    prefix: Option<String>,
    config_dir: Option<PathBuf>,
    context: String,
    disambiguation: Option<String>,
    count: Option<i64>,
    list_locales: bool,
    stats: bool,
    compile: Option<PathBuf>,
    source_text: Option<String>,
}

fn parse_args() -> std::result::Result<Option<Args>, pico_args::Error> {
    let mut args = pico_args::Arguments::from_env();
    if args.contains(["-h", "--help"]) {
        return Ok(None);
    }

    let parsed = Args {
        lang: args.opt_value_from_str("--lang")?,
        dirs: args.values_from_str("--dir")?,
        prefix: args.opt_value_from_str("--prefix")?,
        config_dir: args.opt_value_from_str("--config-dir")?,
        context: args
            .opt_value_from_str("--context")?
            .unwrap_or_default(),
        disambiguation: args.opt_value_from_str("--disambiguation")?,
        count: args.opt_value_from_str("--count")?,
        list_locales: args.contains("--list-locales"),
        stats: args.contains("--stats"),
        compile: args.opt_value_from_str("--compile")?,
        source_text: args
            .finish()
            .into_iter()
            .next()
            .and_then(|s| s.into_string().ok()),
    };
    Ok(Some(parsed))
}

fn run(args: Args) -> Result<()> {
    // A corrupt settings file is already reported by the loader's warn log.
    let (mut settings, _warning) = config::load_with_override(args.config_dir.clone());
    if args.prefix.is_some() {
        settings.catalogs.prefix = args.prefix.clone();
    }
    settings.catalogs.directories.extend(args.dirs.iter().cloned());

    let store = CatalogStore::from_config(&settings, args.lang.as_deref())?;

    if args.list_locales {
        for tag in store.registry().available_tags() {
            println!("{}", tag);
        }
    }

    let catalog = store.snapshot();

    if args.stats {
        let report = catalog.report();
        println!("locale:     {}", catalog.locale());
        println!("entries:    {}", catalog.len());
        println!("contexts:   {}", catalog.contexts().len());
        println!("sources:    {}", report.sources.len());
        for origin in &report.sources {
            println!("  {}", origin);
        }
        println!("overridden: {}", report.overridden.len());
        println!("skipped:    {}", report.skipped);
    }

    if let Some(out) = &args.compile {
        let file = File::create(out)?;
        catalog.compile(BufWriter::new(file))?;
        eprintln!("wrote {} entries to {}", catalog.len(), out.display());
    }

    if let Some(source) = &args.source_text {
        let disambiguation = args.disambiguation.as_deref();
        let text = match args.count {
            Some(count) => catalog.format_plural(&args.context, source, count, disambiguation),
            None => catalog
                .lookup(&args.context, source, disambiguation)
                .to_string(),
        };
        println!("{}", text);
    }

    Ok(())
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args = match parse_args() {
        Ok(Some(args)) => args,
        Ok(None) => {
            print!("{}", HELP);
            return ExitCode::SUCCESS;
        }
        Err(err) => {
            eprintln!("error: {}\n\n{}", err, HELP);
            return ExitCode::from(2);
        }
    };

    if args.source_text.is_none() && !args.list_locales && !args.stats && args.compile.is_none()
    {
        print!("{}", HELP);
        return ExitCode::from(2);
    }

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err);
            ExitCode::FAILURE
        }
    }
}
