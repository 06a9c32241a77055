//! Runtime module views over a loaded package.
//!
//! A [`ModuleBundle`] is what the engine actually swaps in: the dictionary,
//! connection-cost, and segmenter views, all backed by the same shared
//! [`DataManager`] mapping. Views hold offset spans rather than borrowed
//! slices, so the bundle is `Send + Sync` and moves freely between the build
//! worker and the consuming session threads.

use std::ops::Range;
use std::sync::Arc;

use super::error::PackageError;
use super::manager::DataManager;
use crate::request::EngineType;

/// Name of the section holding the system dictionary image.
pub const DICTIONARY_SECTION: &str = "dictionary";
/// Name of the section holding the connection cost matrix.
pub const CONNECTION_SECTION: &str = "connection";
/// Name of the section holding the segmenter tables.
pub const SEGMENTER_SECTION: &str = "segmenter";

/// Predictor wired downstream of a loaded bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredictorKind {
    /// Conversion-oriented predictor used by the desktop engine.
    Default,
    /// Prediction-heavy predictor used by the mobile engine.
    Mobile,
}

/// System dictionary view.
#[derive(Debug, Clone)]
pub struct Dictionary {
    manager: Arc<DataManager>,
    span: Range<usize>,
}

impl Dictionary {
    /// Raw dictionary image.
    pub fn data(&self) -> &[u8] {
        &self.manager.image()[self.span.clone()]
    }

    /// Size of the dictionary image in bytes.
    pub fn len(&self) -> usize {
        self.span.len()
    }

    /// Returns true if the dictionary section is empty.
    pub fn is_empty(&self) -> bool {
        self.span.is_empty()
    }
}

/// Connection cost matrix view.
#[derive(Debug, Clone)]
pub struct Connector {
    manager: Arc<DataManager>,
    span: Range<usize>,
}

impl Connector {
    /// Raw connection matrix image.
    pub fn data(&self) -> &[u8] {
        &self.manager.image()[self.span.clone()]
    }
}

/// Segmenter table view.
#[derive(Debug, Clone)]
pub struct Segmenter {
    manager: Arc<DataManager>,
    span: Range<usize>,
}

impl Segmenter {
    /// Raw segmenter table image.
    pub fn data(&self) -> &[u8] {
        &self.manager.image()[self.span.clone()]
    }
}

/// The full set of runtime modules materialized from one package.
#[derive(Debug, Clone)]
pub struct ModuleBundle {
    engine_type: EngineType,
    data_manager: Arc<DataManager>,
    dictionary: Dictionary,
    connector: Connector,
    segmenter: Segmenter,
}

impl ModuleBundle {
    /// Builds the module views over `manager`.
    ///
    /// Fails if any of the required module sections is absent from the
    /// package.
    pub fn new(manager: Arc<DataManager>, engine_type: EngineType) -> Result<Self, PackageError> {
        let span = |name: &'static str| {
            manager
                .section_span(name)
                .ok_or(PackageError::MissingSection(name))
        };

        let dictionary = Dictionary {
            manager: Arc::clone(&manager),
            span: span(DICTIONARY_SECTION)?,
        };
        let connector = Connector {
            manager: Arc::clone(&manager),
            span: span(CONNECTION_SECTION)?,
        };
        let segmenter = Segmenter {
            manager: Arc::clone(&manager),
            span: span(SEGMENTER_SECTION)?,
        };

        Ok(Self {
            engine_type,
            data_manager: manager,
            dictionary,
            connector,
            segmenter,
        })
    }

    /// The data manager backing every view in this bundle.
    pub fn data_manager(&self) -> &DataManager {
        &self.data_manager
    }

    /// Engine flavor this bundle was materialized for.
    pub fn engine_type(&self) -> EngineType {
        self.engine_type
    }

    /// Predictor selected by the engine flavor.
    pub fn predictor_kind(&self) -> PredictorKind {
        match self.engine_type {
            EngineType::Desktop => PredictorKind::Default,
            EngineType::Mobile => PredictorKind::Mobile,
        }
    }

    /// System dictionary view.
    pub fn dictionary(&self) -> &Dictionary {
        &self.dictionary
    }

    /// Connection cost view.
    pub fn connector(&self) -> &Connector {
        &self.connector
    }

    /// Segmenter view.
    pub fn segmenter(&self) -> &Segmenter {
        &self.segmenter
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package::writer::PackageWriter;

    const MAGIC: &[u8] = b"YMKT";

    fn mapped_package(dir: &tempfile::TempDir) -> Arc<DataManager> {
        let path = dir.path().join("engine.data");
        let mut writer = PackageWriter::new(MAGIC);
        writer
            .add_section("version", b"1.0.0")
            .add_section(DICTIONARY_SECTION, b"dict-image")
            .add_section(CONNECTION_SECTION, b"conn-image")
            .add_section(SEGMENTER_SECTION, b"segm-image");
        writer.write_to(&path).unwrap();
        Arc::new(DataManager::from_file(path.to_str().unwrap(), MAGIC).unwrap())
    }

    #[test]
    fn test_bundle_exposes_module_data() {
        let dir = tempfile::tempdir().unwrap();
        let bundle = ModuleBundle::new(mapped_package(&dir), EngineType::Desktop).unwrap();

        assert_eq!(bundle.dictionary().data(), b"dict-image");
        assert_eq!(bundle.connector().data(), b"conn-image");
        assert_eq!(bundle.segmenter().data(), b"segm-image");
        assert_eq!(bundle.dictionary().len(), b"dict-image".len());
        assert!(!bundle.dictionary().is_empty());
    }

    #[test]
    fn test_predictor_follows_engine_type() {
        let dir = tempfile::tempdir().unwrap();
        let manager = mapped_package(&dir);

        let desktop = ModuleBundle::new(Arc::clone(&manager), EngineType::Desktop).unwrap();
        assert_eq!(desktop.predictor_kind(), PredictorKind::Default);

        let mobile = ModuleBundle::new(manager, EngineType::Mobile).unwrap();
        assert_eq!(mobile.predictor_kind(), PredictorKind::Mobile);
    }

    #[test]
    fn test_missing_module_section_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no_dict.data");
        let mut writer = PackageWriter::new(MAGIC);
        writer
            .add_section("version", b"1.0.0")
            .add_section(CONNECTION_SECTION, b"conn")
            .add_section(SEGMENTER_SECTION, b"segm");
        writer.write_to(&path).unwrap();

        let manager =
            Arc::new(DataManager::from_file(path.to_str().unwrap(), MAGIC).unwrap());
        let result = ModuleBundle::new(manager, EngineType::Desktop);
        assert!(matches!(
            result,
            Err(PackageError::MissingSection(DICTIONARY_SECTION))
        ));
    }

    #[test]
    fn test_bundle_version_matches_manager() {
        let dir = tempfile::tempdir().unwrap();
        let bundle = ModuleBundle::new(mapped_package(&dir), EngineType::Desktop).unwrap();
        assert_eq!(bundle.data_manager().data_version(), "1.0.0");
    }
}
