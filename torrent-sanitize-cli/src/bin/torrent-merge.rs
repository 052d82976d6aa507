use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::debug;
use torrent_sanitize::{Profile, Torrent, UrlFilter, fs::write_atomic, sanitize::AnnounceList};
use torrent_sanitize_cli::{load_buffer, load_url_filter, setup_logging};

#[derive(Debug, Clone, Parser)]
#[command(version, about = "torrent-merge\n\n\
    Merges the announce urls of the source torrents into the destination torrent.\n\
    Only the announce urls of the destination are changed.")]
struct Args {
    /// Log debug messages
    #[arg(short, long)]
    debug: bool,

    /// Filter announce urls with the rules in FILE
    #[arg(short = 'f', long, value_name = "FILE")]
    url_filter: Option<PathBuf>,

    destination: PathBuf,

    sources: Vec<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    setup_logging(args.debug)?;

    let filter = match &args.url_filter {
        Some(path) => load_url_filter(path)?,
        None => UrlFilter::new(),
    };

    let dest_buffer = load_buffer(&args.destination)?;
    let mut dest = Torrent::load(dest_buffer.bytes(), Profile::ANNOUNCE_INFO)
        .with_context(|| format!("{}: invalid torrent", args.destination.display()))?;

    println!("Merging announce urls for {}", dest.info_hash());

    let mut list = AnnounceList::new(&filter);
    list.force_merge_all(filter.forced_urls());
    list.merge_torrent(&dest);

    for path in &args.sources {
        let buffer = load_buffer(path)?;
        let source = Torrent::load(buffer.bytes(), Profile::ANNOUNCE_ONLY)
            .with_context(|| format!("{}: invalid torrent", path.display()))?;
        list.merge_torrent(&source);
    }

    dest.replace_announce_urls(list);
    debug!("Announce-url: {}", dest.announce());
    for tier in dest.announce_list() {
        debug!(" - [ {} ]", tier.join(", "));
    }

    write_atomic(&args.destination, &dest.to_bytes())
        .with_context(|| format!("{}: couldn't write torrent", args.destination.display()))?;
    Ok(())
}
