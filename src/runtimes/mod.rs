//! Version providers for every supported language, plus the installation
//! pipeline and per-language directory management built on top of them.

pub mod common;
pub mod github;
pub mod go;
pub mod java;
mod manager;
pub mod node;
pub mod perl;
mod pipeline;
mod provider;
pub mod python;
pub mod raku;
pub mod ruby;
pub mod solr;

use anyhow::Result;

pub use go::GoProvider;
pub use java::JavaProvider;
pub use manager::LanguageManager;
pub use node::NodeProvider;
pub use perl::PerlProvider;
pub use pipeline::install;
pub use provider::{LATEST, Release, Session, VersionProvider};
pub use python::PythonProvider;
pub use raku::RakuProvider;
pub use ruby::RubyProvider;
pub use solr::SolrProvider;

use crate::core::Language;
use crate::core::archive::ArchiveLayout;

/// The closed set of providers, one per [`Language`]
#[derive(Debug, Clone)]
pub enum Provider {
    Go(GoProvider),
    Java(JavaProvider),
    Node(NodeProvider),
    Perl(PerlProvider),
    Python(PythonProvider),
    Raku(RakuProvider),
    Ruby(RubyProvider),
    Solr(SolrProvider),
}

impl Provider {
    /// Provider with the public upstream endpoints
    #[must_use]
    pub fn for_language(language: Language) -> Self {
        match language {
            Language::Go => Self::Go(GoProvider::default()),
            Language::Java => Self::Java(JavaProvider::default()),
            Language::Node => Self::Node(NodeProvider::default()),
            Language::Perl => Self::Perl(PerlProvider::default()),
            Language::Python => Self::Python(PythonProvider::default()),
            Language::Raku => Self::Raku(RakuProvider::default()),
            Language::Ruby => Self::Ruby(RubyProvider::default()),
            Language::Solr => Self::Solr(SolrProvider::default()),
        }
    }
}

macro_rules! dispatch {
    ($self:ident, $p:ident => $body:expr) => {
        match $self {
            Provider::Go($p) => $body,
            Provider::Java($p) => $body,
            Provider::Node($p) => $body,
            Provider::Perl($p) => $body,
            Provider::Python($p) => $body,
            Provider::Raku($p) => $body,
            Provider::Ruby($p) => $body,
            Provider::Solr($p) => $body,
        }
    };
}

impl VersionProvider for Provider {
    fn language(&self) -> Language {
        dispatch!(self, p => p.language())
    }

    async fn list(&self, session: &Session, all: bool) -> Result<Vec<String>> {
        dispatch!(self, p => p.list(session, all).await)
    }

    async fn latest(&self, session: &Session) -> Result<String> {
        dispatch!(self, p => p.latest(session).await)
    }

    async fn latest_release(&self, session: &Session) -> Result<Release> {
        dispatch!(self, p => p.latest_release(session).await)
    }

    fn validate(&self, version: &str) -> Result<()> {
        dispatch!(self, p => p.validate(version))
    }

    async fn release(&self, session: &Session, version: &str) -> Result<Release> {
        dispatch!(self, p => p.release(session, version).await)
    }

    fn layout(&self) -> ArchiveLayout {
        dispatch!(self, p => p.layout())
    }

    fn bin_dirs(&self) -> &'static [&'static str] {
        dispatch!(self, p => p.bin_dirs())
    }
}
