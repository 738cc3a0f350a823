//! Parallel parsing of independent documents
//!
//! Every rayon worker gets its own [`Parser`]; the table is shared through the
//! [`Language`] handle.

use rayon::prelude::*;
use tracing::debug;

use crate::error::Result;
use crate::language::Language;
use crate::parser::{ParseOptions, Parser};
use crate::tree::Tree;

/// Parse every source with `language`, results in input order
pub fn parse_batch<S: AsRef<str> + Sync>(language: &Language, sources: &[S]) -> Vec<Result<Tree>> {
    parse_batch_with(language, ParseOptions::default(), sources)
}

pub fn parse_batch_with<S: AsRef<str> + Sync>(
    language: &Language,
    options: ParseOptions,
    sources: &[S],
) -> Vec<Result<Tree>> {
    debug!(language = language.name(), documents = sources.len(), "parsing batch");
    sources
        .par_iter()
        .map_init(
            || Parser::new(language.clone()).with_options(options),
            |parser, source| parser.parse(source.as_ref(), None),
        )
        .collect()
}
