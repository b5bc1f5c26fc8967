use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::aggregator::Aggregator;
use crate::associate::{Docset, associate};
use crate::config::DocsConfig;
use crate::detect::{CodeShape, Detector};
use crate::doctag::{DocTagParser, MetaTagRegistry};
use crate::error::{DocsError, Result};
use crate::merger::{DocFragment, merge};
use crate::model::SourceLocation;
use crate::passes::{PassContext, load_snapshots, run_passes};
use crate::relations::Relations;
use crate::warnings::{WarnKind, Warning, Warnings};

/// Finished output of one run.
#[derive(Debug)]
pub struct Documentation {
    pub relations: Relations,
    /// Every enabled warning, in file order.
    pub warnings: Vec<Warning>,
}

/// Runs the whole pipeline: association, merging, aggregation and passes.
#[derive(Debug, Clone)]
pub struct Extractor {
    config: DocsConfig,
    detector: Detector,
    meta: MetaTagRegistry,
}

impl Extractor {
    pub fn new(config: DocsConfig) -> Self {
        let detector = Detector::new(&config.ext_namespaces);
        let meta = MetaTagRegistry::new(config.meta_tags.iter().cloned());
        Self { config, detector, meta }
    }

    pub fn config(&self) -> &DocsConfig {
        &self.config
    }

    /// Turn one in-memory source into merged fragments, in declaration order.
    ///
    /// Tag problems are reported into `warnings`; a source that cannot be
    /// parsed at all is an error.
    pub fn parse_source(&self, path: &Path, source: &str, warnings: &mut Warnings) -> Result<Vec<DocFragment>> {
        let docsets = associate(path, source, &self.config.ext_namespaces)?;
        let parser = DocTagParser::new(&self.meta);
        let display = path.to_string_lossy();
        let mut fragments = Vec::new();
        for docset in docsets.into_iter().filter(Docset::is_doc) {
            let doc = parser.parse(&docset.comment);
            for (kind, message) in &doc.problems {
                warnings.warn_at(*kind, message.clone(), &display, docset.line);
            }
            let shape = self.detector.detect(docset.code.as_ref());
            if docset.implicit && !matches!(shape, CodeShape::Class(_)) {
                continue;
            }
            let location = SourceLocation::new(&*display, docset.line);
            if let Some(fragment) = merge(&doc, shape, docset.code.is_some(), location, warnings) {
                fragments.push(fragment);
            }
        }
        tracing::debug!(path = %path.display(), fragments = fragments.len(), "parsed source");
        Ok(fragments)
    }

    /// Read, parse and resolve every file.
    ///
    /// All files are read (and version snapshots loaded) before parsing
    /// starts. Files are parsed in parallel but folded in input order.
    pub fn extract<I>(&self, paths: I) -> Result<Documentation>
    where
        I: IntoIterator<Item = PathBuf>,
    {
        let mut sources = Vec::new();
        for path in paths {
            let text = fs::read_to_string(&path).map_err(|error| DocsError::Io {
                path: path.clone(),
                error,
            })?;
            sources.push((path, text));
        }
        self.extract_sources(sources)
    }

    /// [`Extractor::extract`] over sources already in memory.
    pub fn extract_sources(&self, sources: Vec<(PathBuf, String)>) -> Result<Documentation> {
        let snapshots = load_snapshots(&self.config.imports)?;
        let mut warnings = Warnings::with_rules(&self.config.warnings)?;

        let parsed: Vec<(Result<Vec<DocFragment>>, Vec<Warning>)> = sources
            .par_iter()
            .map(|(path, text)| {
                let mut local = warnings.fork();
                let result = self.parse_source(path, text, &mut local);
                (result, local.into_emitted())
            })
            .collect();

        let mut files = Vec::with_capacity(parsed.len());
        for (result, emitted) in parsed {
            warnings.extend(emitted);
            match result {
                Ok(fragments) => files.push(fragments),
                Err(DocsError::Parse {
                    path,
                    line,
                    column,
                    message,
                }) => warnings.warn_at(
                    WarnKind::Parse,
                    format!("column {column}: {message}"),
                    &path.to_string_lossy(),
                    line,
                ),
                Err(error) => return Err(error),
            }
        }

        let mut aggregator = Aggregator::new(self.config.ignore_global, &mut warnings);
        for fragments in files {
            aggregator.aggregate_file(fragments);
        }
        let classes = aggregator.finish();
        tracing::info!(files = sources.len(), classes = classes.len(), "aggregated classes");

        let mut relations = Relations::new(classes);
        let mut ctx = PassContext {
            config: &self.config,
            snapshots: &snapshots,
            warnings: &mut warnings,
        };
        run_passes(&mut relations, &mut ctx)?;

        Ok(Documentation {
            relations,
            warnings: warnings.into_emitted(),
        })
    }
}
