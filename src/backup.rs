use crate::store::{Collection, CollectionStore, Document};
use anyhow::{anyhow, Context};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

const MANIFEST_ENTRY: &str = "manifest.json";
pub const BUNDLE_FORMAT: &str = "teachermate-collections-v1";
const BUNDLE_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestEntry {
    pub collection: String,
    pub path: String,
    pub count: usize,
    pub sha256: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub format: String,
    pub version: u32,
    pub app_version: String,
    pub exported_at: String,
    pub entries: Vec<ManifestEntry>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupSummary {
    pub bundle_format: String,
    pub collections: Vec<CollectionCount>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CollectionCount {
    pub collection: &'static str,
    pub count: usize,
}

fn entry_path(collection: Collection) -> String {
    format!("collections/{}.json", collection.as_str())
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// Writes every collection to a zip bundle with a checksummed manifest.
pub fn export_bundle(store: &dyn CollectionStore, out_path: &Path) -> anyhow::Result<BackupSummary> {
    if let Some(parent) = out_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.to_string_lossy()))?;
    }
    let out_file = File::create(out_path).with_context(|| {
        format!(
            "failed to create output file {}",
            out_path.to_string_lossy()
        )
    })?;
    let mut zip = ZipWriter::new(out_file);
    let opts = FileOptions::default().compression_method(CompressionMethod::Deflated);

    let mut entries = Vec::new();
    let mut counts = Vec::new();
    for collection in Collection::ALL {
        let docs = store
            .get_items(collection)
            .with_context(|| format!("failed to read collection {}", collection))?;
        let bytes = serde_json::to_vec_pretty(&docs)
            .with_context(|| format!("failed to serialize {}", collection))?;
        let path = entry_path(collection);
        zip.start_file(path.as_str(), opts)
            .with_context(|| format!("failed to start entry {}", path))?;
        zip.write_all(&bytes)
            .with_context(|| format!("failed to write entry {}", path))?;
        entries.push(ManifestEntry {
            collection: collection.as_str().to_string(),
            path,
            count: docs.len(),
            sha256: sha256_hex(&bytes),
        });
        counts.push(CollectionCount {
            collection: collection.as_str(),
            count: docs.len(),
        });
    }

    let manifest = Manifest {
        format: BUNDLE_FORMAT.to_string(),
        version: BUNDLE_VERSION,
        app_version: env!("CARGO_PKG_VERSION").to_string(),
        exported_at: chrono::Utc::now().to_rfc3339(),
        entries,
    };
    zip.start_file(MANIFEST_ENTRY, opts)
        .context("failed to start manifest entry")?;
    zip.write_all(
        serde_json::to_string_pretty(&manifest)
            .context("failed to serialize manifest")?
            .as_bytes(),
    )
    .context("failed to write manifest entry")?;
    zip.finish().context("failed to finalize zip bundle")?;

    tracing::info!(path = %out_path.to_string_lossy(), "backup exported");
    Ok(BackupSummary {
        bundle_format: BUNDLE_FORMAT.to_string(),
        collections: counts,
    })
}

/// Replaces the collections listed in a bundle. Every entry is read and
/// verified before the store is touched.
pub fn import_bundle(store: &mut dyn CollectionStore, in_path: &Path) -> anyhow::Result<BackupSummary> {
    let in_file = File::open(in_path)
        .with_context(|| format!("failed to open bundle {}", in_path.to_string_lossy()))?;
    let mut archive = ZipArchive::new(in_file).context("invalid zip archive")?;

    let mut manifest_text = String::new();
    archive
        .by_name(MANIFEST_ENTRY)
        .context("bundle missing manifest.json")?
        .read_to_string(&mut manifest_text)
        .context("failed to read manifest.json")?;
    let manifest: Manifest =
        serde_json::from_str(&manifest_text).context("manifest.json is invalid")?;
    if manifest.format != BUNDLE_FORMAT {
        return Err(anyhow!("unsupported bundle format: {}", manifest.format));
    }

    let mut staged: Vec<(Collection, Vec<Document>)> = Vec::new();
    for entry in &manifest.entries {
        let collection = Collection::parse(&entry.collection)
            .ok_or_else(|| anyhow!("unknown collection in manifest: {}", entry.collection))?;
        let mut bytes = Vec::new();
        archive
            .by_name(&entry.path)
            .with_context(|| format!("bundle missing {}", entry.path))?
            .read_to_end(&mut bytes)
            .with_context(|| format!("failed to read {}", entry.path))?;
        let actual = sha256_hex(&bytes);
        if actual != entry.sha256 {
            return Err(anyhow!(
                "checksum mismatch for {}: expected {}, got {}",
                entry.path,
                entry.sha256,
                actual
            ));
        }
        let docs: Vec<Document> = serde_json::from_slice(&bytes)
            .with_context(|| format!("{} is not a list of documents", entry.path))?;
        staged.push((collection, docs));
    }

    let mut counts = Vec::new();
    for (collection, docs) in staged {
        let count = docs.len();
        store
            .restore_collection(collection, docs)
            .with_context(|| format!("failed to restore {}", collection))?;
        counts.push(CollectionCount {
            collection: collection.as_str(),
            count,
        });
    }
    tracing::info!(path = %in_path.to_string_lossy(), "backup imported");
    Ok(BackupSummary {
        bundle_format: manifest.format,
        collections: counts,
    })
}
