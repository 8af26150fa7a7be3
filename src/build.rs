use crate::cli::BuildArgs;
use crate::error::{ErrorKind, Result};
use crate::input;
use exn::ResultExt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use subcat_catalog::models::CatalogRecord;
use subcat_catalog::sink::{CatalogSink, JsonLinesSink};
use subcat_catalog::{BuildSummary, LanguageIndex};
use subcat_config::Config;
use subcat_dump::error::ErrorKind as DumpErrorKind;
use subcat_dump::{
    AttachmentRecord, AttachmentSizes, FileRecord, Parse, ReadStats, Reader, SizeRecord, Stream, TorrentRecord, link,
};
use tracing::instrument;

type Input = Box<dyn std::io::BufRead>;

/// Read the exports, build every record and write the catalog.
#[instrument(skip_all)]
pub fn run(config: &Config, args: &BuildArgs) -> Result<BuildSummary> {
    let schema = &config.schema;
    let pipeline = config.pipeline().or_raise(|| ErrorKind::Config)?;

    let mut sizes = config.sizes();
    let size_stats = match &args.sizes {
        Some(path) => Some(load_sizes(&mut sizes, path, &schema.sizes)?),
        None => None,
    };

    let mut attachments = reader::<AttachmentRecord>(&args.attachments, &schema.attachments)?;
    let mut files = reader::<FileRecord>(&args.files, &schema.files)?;
    let mut torrents = reader::<TorrentRecord>(&args.torrents, &schema.torrents)?;
    let linked = link(&sizes, &mut attachments, &mut files, &mut torrents).or_raise(|| ErrorKind::Pipeline)?;

    let mut summary = BuildSummary::new(linked.stats)
        .with_stream(Stream::Attachments, attachments.finish().or_raise(|| ErrorKind::Input(args.attachments.clone()))?)
        .with_stream(Stream::Files, files.finish().or_raise(|| ErrorKind::Input(args.files.clone()))?)
        .with_stream(Stream::Torrents, torrents.finish().or_raise(|| ErrorKind::Input(args.torrents.clone()))?);
    if let Some(stats) = size_stats {
        summary = summary.with_stream(Stream::Sizes, stats);
    }

    let records = pipeline
        .run_with_workers(&linked.bundles, args.workers.or(config.workers))
        .or_raise(|| ErrorKind::Pipeline)?;
    records.iter().for_each(|record| summary.record(record));

    if let Some(path) = &args.index {
        let index: LanguageIndex = records.iter().collect();
        write_index(&index, path)?;
    }
    match &args.output {
        Some(path) => {
            let file = File::create(path).or_raise(|| ErrorKind::Output(path.display().to_string()))?;
            write_catalog(JsonLinesSink::new(BufWriter::new(file)), records, &path.display().to_string())?;
        },
        None => write_catalog(JsonLinesSink::new(BufWriter::new(std::io::stdout())), records, "stdout")?,
    }
    Ok(summary)
}

fn reader<T: Parse>(path: &Path, columns: &T::Columns) -> Result<Reader<Input, T>> {
    Reader::new(input::open(path)?, columns).or_raise(|| ErrorKind::Input(path.to_path_buf()))
}

/// The size table is optional, so an empty one only warns.
fn load_sizes(sizes: &mut AttachmentSizes, path: &Path, columns: &<SizeRecord as Parse>::Columns) -> Result<ReadStats> {
    let mut reader = match Reader::<Input, SizeRecord>::new(input::open(path)?, columns) {
        Ok(reader) => reader,
        Err(err) if matches!(*err, DumpErrorKind::EmptyStream(_)) => {
            tracing::warn!(path = %path.display(), "attachment size table is empty");
            return Ok(ReadStats::default());
        },
        Err(err) => return Err(err).or_raise(|| ErrorKind::Input(path.to_path_buf())),
    };
    sizes.load(&mut reader).or_raise(|| ErrorKind::Input(path.to_path_buf()))?;
    tracing::info!(sizes = sizes.len(), "loaded attachment sizes");
    Ok(*reader.stats())
}

fn write_catalog(mut sink: impl CatalogSink, records: Vec<CatalogRecord>, target: &str) -> Result<()> {
    sink.put_all(records).or_raise(|| ErrorKind::Output(target.to_string()))?;
    sink.finish().or_raise(|| ErrorKind::Output(target.to_string()))
}

fn write_index(index: &LanguageIndex, path: &Path) -> Result<()> {
    let target = || ErrorKind::Output(path.display().to_string());
    let mut writer = BufWriter::new(File::create(path).or_raise(target)?);
    serde_json::to_writer_pretty(&mut writer, index).or_raise(target)?;
    writer.write_all(b"\n").or_raise(target)?;
    writer.flush().or_raise(target)?;
    tracing::info!(languages = index.len(), path = %path.display(), "wrote language index");
    Ok(())
}
