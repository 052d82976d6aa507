use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use torrent_sanitize::{
    Profile, SanitizeSettings, Torrent,
    fs::write_atomic,
    sanitize::{Matcher, MetaKeyFilter},
};
use torrent_sanitize_cli::{load_buffer, load_url_filter, parse_key_value, setup_logging};

#[derive(Debug, Clone, Parser)]
#[command(version, about = "torrent-sanitize\n\n\
    Shows details of torrent files and cleans up their announce urls and meta entries.\n\
    Regular expressions always match the complete key or url, like ^...$.")]
struct Args {
    /// Show details of the torrent (default unless -H or -u are given)
    #[arg(short, long)]
    info: bool,

    /// List the files of the torrent with the details
    #[arg(short, long)]
    files: bool,

    /// Sanitize INPUT and write the result to OUTPUT if given
    #[arg(short, long)]
    sanitize: bool,

    /// Show the info-hash
    #[arg(short = 'H', long)]
    hash: bool,

    /// Show the announce urls
    #[arg(short, long)]
    urls: bool,

    /// Require names and paths in the info dictionary to be valid utf-8
    #[arg(short = 'v', long)]
    verify: bool,

    /// Log debug messages
    #[arg(short, long)]
    debug: bool,

    /// Keys of text entries to keep
    #[arg(long, value_name = "REGEX", default_value = ".*")]
    meta_filter_text: String,

    /// Keys of numeric entries to keep
    #[arg(long, value_name = "REGEX", default_value = ".*")]
    meta_filter_number: String,

    /// Keys of entries to keep whatever their value
    #[arg(long, value_name = "REGEX", default_value = "")]
    meta_filter_any: String,

    /// Add a text entry
    #[arg(long, value_name = "KEY=VALUE", value_parser = parse_key_value)]
    meta_add_string: Vec<(String, String)>,

    /// Add an entry with an already bencoded value
    #[arg(long, value_name = "KEY=VALUE", value_parser = parse_key_value)]
    meta_add_raw: Vec<(String, String)>,

    /// Filter announce urls with the rules in FILE
    #[arg(long, value_name = "FILE")]
    url_filter: Option<PathBuf>,

    input: PathBuf,

    #[arg(requires = "sanitize")]
    output: Option<PathBuf>,
}

impl Args {
    fn settings(&self) -> Result<SanitizeSettings> {
        let mut settings = SanitizeSettings::new();
        settings.check_info_utf8 = self.verify;
        settings.meta_filter = MetaKeyFilter {
            text: Matcher::new(&self.meta_filter_text)?,
            number: Matcher::new(&self.meta_filter_number)?,
            other: Matcher::new(&self.meta_filter_any)?,
        };
        for (key, value) in &self.meta_add_string {
            settings.add_meta_string(key, value)?;
        }
        for (key, value) in &self.meta_add_raw {
            settings.add_meta_raw(key, value.as_bytes())?;
        }
        if let Some(path) = &self.url_filter {
            settings.url_filter = load_url_filter(path)?;
        }
        Ok(settings)
    }

    fn show_info(&self) -> bool {
        self.info || !(self.hash || self.urls)
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    setup_logging(args.debug)?;
    let settings = args.settings()?;

    let buffer = load_buffer(&args.input)?;
    let filename = buffer.filename().display();

    if args.sanitize {
        let mut torrent = Torrent::load_with(buffer.bytes(), Profile::STRICT, &settings)
            .with_context(|| format!("{}: invalid torrent", filename))?;
        if args.hash {
            println!("{}", torrent.info_hash());
        }
        torrent.sanitize_announce_urls(&settings, None);
        if let Some(output) = &args.output {
            write_atomic(output, &torrent.to_bytes())
                .with_context(|| format!("{}: couldn't write torrent", output.display()))?;
        }
        if args.info {
            print!("{}", torrent.details(false));
        }
    } else if args.show_info() {
        let torrent = Torrent::load_with(buffer.bytes(), Profile::STRICT, &settings)
            .with_context(|| format!("{}: invalid torrent", filename))?;
        print!("{}", torrent.details(args.files));
    } else if args.hash {
        let torrent = Torrent::load(buffer.bytes(), Profile::ANNOUNCE_INFO)
            .with_context(|| format!("{}: invalid torrent", filename))?;
        println!("{}", torrent.info_hash());
        if args.urls {
            print!("{}", torrent.url_listing());
        }
    } else {
        let torrent = Torrent::load(buffer.bytes(), Profile::ANNOUNCE_ONLY)
            .with_context(|| format!("{}: invalid torrent", filename))?;
        print!("{}", torrent.url_listing());
    }

    Ok(())
}
