use crate::error::{ErrorKind, Result};
use crate::models::{CatalogRecord, ClassifiedFile, ResolvedTrack};
use crate::synth::Synthesizer;
use exn::ResultExt;
use rayon::prelude::*;
use std::collections::BTreeSet;
use subcat_classify::{Lexicon, classify};
use subcat_dump::TorrentBundle;
use tracing::instrument;

/// Turns linked torrent bundles into catalog records.
///
/// Holds only immutable lookup tables, so a single pipeline is shared by
/// every worker.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    pub lexicon: Lexicon,
    pub synthesizer: Synthesizer,
}
impl Pipeline {
    pub fn new(lexicon: Lexicon, synthesizer: Synthesizer) -> Self {
        Self { lexicon, synthesizer }
    }

    /// Classify every file of a bundle and resolve its track languages.
    pub fn prepare(&self, bundle: &TorrentBundle) -> Vec<ClassifiedFile> {
        let title = &bundle.torrent.name;
        bundle
            .files
            .iter()
            .map(|linked| {
                let filename = &linked.file.filename;
                let tracks = linked
                    .tracks
                    .iter()
                    .map(|track| ResolvedTrack {
                        resolved_language: self.lexicon.resolve(&track.raw_language_tag, title, filename).to_string(),
                        track: track.clone(),
                    })
                    .collect();
                ClassifiedFile { file: linked.file.clone(), classification: classify(filename), tracks }
            })
            .collect()
    }

    #[instrument(level = "trace", skip_all, fields(torrent = bundle.torrent.id))]
    pub fn build(&self, bundle: &TorrentBundle) -> CatalogRecord {
        let files = self.prepare(bundle);
        let torrent = &bundle.torrent;
        let subtitle_entries = self.synthesizer.synthesize(torrent, &files);
        let languages: BTreeSet<String> =
            files.iter().flat_map(|file| &file.tracks).map(|track| track.resolved_language.clone()).collect();
        let episodes_available: BTreeSet<u32> =
            files.iter().flat_map(|file| file.classification.episodes()).collect();
        CatalogRecord {
            torrent_id: torrent.id,
            display_name: torrent.name.clone(),
            languages,
            subtitle_entries,
            episodes_available,
            file_count: torrent.file_count,
            total_size: torrent.total_size,
            external_ref_id: torrent.external_ref,
        }
    }

    /// Build every bundle on the global rayon pool. Records come back in
    /// input order.
    #[instrument(skip_all, fields(bundles = bundles.len()))]
    pub fn run(&self, bundles: &[TorrentBundle]) -> Vec<CatalogRecord> {
        let records: Vec<CatalogRecord> = bundles.par_iter().map(|bundle| self.build(bundle)).collect();
        tracing::info!(records = records.len(), "built catalog records");
        records
    }

    /// Like [`run`](Self::run), on a dedicated pool of `workers` threads
    /// (rayon's default when `None`).
    pub fn run_with_workers(&self, bundles: &[TorrentBundle], workers: Option<usize>) -> Result<Vec<CatalogRecord>> {
        let Some(workers) = workers else {
            return Ok(self.run(bundles));
        };
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|index| format!("subcat-worker-{index}"))
            .build()
            .or_raise(|| ErrorKind::WorkerPool)?;
        tracing::debug!(workers, "using dedicated worker pool");
        Ok(pool.install(|| self.run(bundles)))
    }
}
