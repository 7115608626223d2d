//! Sitemap document parsing.
//!
//! Accepts both `<urlset>` and `<sitemapindex>` roots. Elements must be in
//! the sitemaps.org namespace, or carry no namespace at all.

use std::collections::BTreeSet;

use quick_xml::events::Event;
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::reader::NsReader;

use crate::error::{AppError, Result};

/// The sitemaps.org protocol namespace.
pub const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

/// Root element kind of a sitemap document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SitemapKind {
    /// `<urlset>`: entries are content URLs
    UrlSet,
    /// `<sitemapindex>`: entries point at further sitemaps
    Index,
}

impl SitemapKind {
    fn entry_tag(self) -> &'static [u8] {
        match self {
            SitemapKind::UrlSet => b"url",
            SitemapKind::Index => b"sitemap",
        }
    }
}

/// Parsed sitemap: its kind and the `<loc>` of every entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SitemapDocument {
    pub kind: SitemapKind,
    pub locs: BTreeSet<String>,
}

impl SitemapDocument {
    pub fn is_index(&self) -> bool {
        self.kind == SitemapKind::Index
    }

    /// Content URLs only; an index has none of its own.
    pub fn into_urls(self) -> BTreeSet<String> {
        match self.kind {
            SitemapKind::UrlSet => self.locs,
            SitemapKind::Index => BTreeSet::new(),
        }
    }
}

fn in_sitemap_ns(ns: &ResolveResult<'_>) -> bool {
    match ns {
        ResolveResult::Bound(Namespace(uri)) => *uri == SITEMAP_NS.as_bytes(),
        ResolveResult::Unbound => true,
        ResolveResult::Unknown(_) => false,
    }
}

fn root_kind(in_ns: bool, local_name: &[u8]) -> Result<SitemapKind> {
    match (in_ns, local_name) {
        (true, b"urlset") => Ok(SitemapKind::UrlSet),
        (true, b"sitemapindex") => Ok(SitemapKind::Index),
        _ => Err(AppError::parse(format!(
            "unexpected root element <{}>",
            String::from_utf8_lossy(local_name)
        ))),
    }
}

/// Parse a sitemap or sitemap index.
///
/// Any well-formedness problem is reported as [`AppError::Parse`] or
/// [`AppError::Xml`]; nothing is returned for a partial document.
pub fn parse_sitemap(xml: &str) -> Result<SitemapDocument> {
    let mut reader = NsReader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut kind: Option<SitemapKind> = None;
    let mut root_closed = false;
    let mut depth = 0usize;
    let mut in_entry = false;
    let mut loc: Option<String> = None;
    let mut locs = BTreeSet::new();

    loop {
        let (ns, event) = reader.read_resolved_event()?;
        let in_ns = in_sitemap_ns(&ns);

        match event {
            Event::Start(e) => {
                depth += 1;
                let name = e.local_name();
                match depth {
                    1 if kind.is_some() || root_closed => {
                        return Err(AppError::parse("multiple root elements"));
                    }
                    1 => kind = Some(root_kind(in_ns, name.as_ref())?),
                    2 => {
                        in_entry = kind.is_some_and(|k| in_ns && name.as_ref() == k.entry_tag());
                    }
                    3 if in_entry && in_ns && name.as_ref() == b"loc" => {
                        loc = Some(String::new());
                    }
                    _ => {}
                }
            }
            Event::Empty(e) if depth == 0 => {
                if kind.is_some() || root_closed {
                    return Err(AppError::parse("multiple root elements"));
                }
                kind = Some(root_kind(in_ns, e.local_name().as_ref())?);
                root_closed = true;
            }
            Event::Text(t) => {
                if let Some(buf) = loc.as_mut() {
                    buf.push_str(&t.unescape().map_err(AppError::parse)?);
                }
            }
            Event::CData(c) => {
                if let Some(buf) = loc.as_mut() {
                    buf.push_str(&String::from_utf8_lossy(&c));
                }
            }
            Event::End(_) => {
                match depth {
                    3 => {
                        if let Some(value) = loc.take() {
                            let value = value.trim();
                            if !value.is_empty() {
                                locs.insert(value.to_string());
                            }
                        }
                    }
                    2 => in_entry = false,
                    1 => root_closed = true,
                    _ => {}
                }
                depth = depth.saturating_sub(1);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if depth != 0 {
        return Err(AppError::parse("document ended inside an open element"));
    }
    let kind = kind.ok_or_else(|| AppError::parse("no root element"))?;

    Ok(SitemapDocument { kind, locs })
}
