use crate::Section;
use crate::error::{ErrorKind, Result};
use crate::sink::{Delivery, PageSink};
use exn::ResultExt;
use manget_apt::{Client, Contents};
use manget_deb::extract_file;
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, instrument};

/// What happened to one requested page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PageReport {
    /// No requested section of the page is in the repository. Not an error.
    Missing { page: String },
    /// Every requested section that exists, in request order, and where each
    /// one went.
    Fetched { page: String, deliveries: Vec<(Section, Delivery)> },
}

impl PageReport {
    pub fn page(&self) -> &str {
        match self {
            PageReport::Missing { page } | PageReport::Fetched { page, .. } => page,
        }
    }
}

/// Drives page lookups against one repository.
///
/// For each page: one pass over the `Contents` index to find which sections
/// exist, then for each of those a `Packages` lookup, a download and an
/// extraction. Nothing is shared between sections, so two sections shipped by
/// the same package walk that package twice (the download itself is cached).
pub struct PageFetcher {
    client: Client,
}

impl PageFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Fetch every section of `page` listed in `sections` that the repository
    /// has, handing each to `sink` in `sections` order.
    ///
    /// Any failure after the page was found aborts: a broken package or an
    /// unwritable store won't fix itself for the next page.
    #[instrument(skip(self, sections, sink), fields(sections = sections.len()))]
    pub fn fetch_page(&self, page: &str, sections: &[Section], sink: &mut dyn PageSink) -> Result<PageReport> {
        let available = self.find_sections(page)?;
        let wanted: Vec<(Section, &Contents)> = dedup(sections)
            .into_iter()
            .filter_map(|section| available.get(&section).map(|contents| (section, contents)))
            .filter(|(_, contents)| !contents.packages.is_empty())
            .collect();
        if wanted.is_empty() {
            debug!("no requested section found");
            return Ok(PageReport::Missing { page: page.to_string() });
        }

        let mut deliveries = Vec::with_capacity(wanted.len());
        for (section, contents) in wanted {
            let bytes = self.extract(page, section, contents, sink)?;
            let delivery = sink.accept(page, section, &bytes)?;
            info!(section = %section, "page delivered");
            deliveries.push((section, delivery));
        }
        Ok(PageReport::Fetched { page: page.to_string(), deliveries })
    }

    /// [`fetch_page`](Self::fetch_page) for each of `pages` in turn, calling
    /// `report` as each one finishes. Stops at the first error.
    pub fn run<F>(&self, pages: &[String], sections: &[Section], sink: &mut dyn PageSink, mut report: F) -> Result<()>
    where
        F: FnMut(&PageReport),
    {
        for page in pages {
            let outcome = self.fetch_page(page, sections, sink)?;
            report(&outcome);
        }
        Ok(())
    }

    /// Which sections of `page` the repository has, and who ships them. Every
    /// known section is asked for, whatever the caller requested, so the
    /// index is read exactly once.
    fn find_sections(&self, page: &str) -> Result<HashMap<Section, Contents>> {
        let candidates: HashMap<String, Section> =
            Section::PRIORITY.into_iter().map(|section| (section.candidate_path(page), section)).collect();
        let files: HashSet<String> = candidates.keys().cloned().collect();
        let found = self.client.query_contents(&files).or_raise(|| ErrorKind::Repository(page.to_string()))?;
        Ok(found
            .into_iter()
            .filter_map(|contents| candidates.get(&contents.file).map(|section| (*section, contents)))
            .collect())
    }

    fn extract(&self, page: &str, section: Section, contents: &Contents, sink: &dyn PageSink) -> Result<Vec<u8>> {
        // `first_package_name` only fails for an empty list, filtered out above.
        let name = contents.first_package_name().unwrap_or_default();
        let package = self.client.query_package(name).or_raise(|| ErrorKind::Repository(name.to_string()))?;
        let deb = self.client.download(&package).or_raise(|| ErrorKind::Repository(name.to_string()))?;
        debug!(package = name, section = %section, "extracting page");
        extract_file(deb, &contents.file, sink.payload()).or_raise(|| ErrorKind::Extract(format!("{page}({section})")))
    }
}

fn dedup(sections: &[Section]) -> Vec<Section> {
    let mut seen = HashSet::new();
    sections.iter().copied().filter(|section| seen.insert(*section)).collect()
}
