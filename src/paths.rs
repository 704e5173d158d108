//! Archive path parsing.
//!
//! Archive-relative paths follow the `pkgkey/service/type/file` convention,
//! with two special layouts:
//!
//! ```text
//! pkg-1.0/kibana/dashboard/overview.json          <- regular asset
//! pkg-1.0/dataset/nginx/logs/log/stream.yml       <- dataset-scoped asset
//! pkg-1.0/kibana/fields.yml                       <- top-level fields file
//! ```

/// Structured description of one archive path.
///
/// Derived deterministically from the path string; always recomputed, never
/// mutated. Missing segments come back as empty strings rather than failing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetParts {
    /// Composite `name-version` package key (first path segment).
    pub pkgkey: String,
    /// Consuming service, e.g. `kibana` or `elasticsearch`. Empty for
    /// top-level fields files.
    pub service: String,
    /// Asset type segment, or the literal `fields` for fields files.
    pub asset_type: String,
    /// File name. Empty for directory-like paths.
    pub file: String,
    /// Dataset name when the asset sits under a `dataset/<name>/` prefix.
    pub dataset: Option<String>,
    /// The original path string, unchanged.
    pub path: String,
}

/// Marker segment introducing a dataset-scoped asset.
const DATASET_MARKER: &str = "dataset";

/// Type assigned to top-level fields definition files.
const FIELDS_TYPE: &str = "fields";

/// Map an archive-relative path to its structured parts.
///
/// Pure and synchronous; no cache or network side effects. Idempotent with
/// respect to the input string.
pub fn parse_path(path: &str) -> AssetParts {
    let mut segments = path.splitn(4, '/');
    let pkgkey = segments.next().unwrap_or_default().to_string();
    let mut service = segments.next().map(str::to_string);
    let mut asset_type = segments.next().map(str::to_string);
    let mut file = segments.next().map(str::to_string);
    let mut dataset = None;

    if service.as_deref() == Some(DATASET_MARKER) {
        // pkgkey/dataset/<name>/service/type/file: the third segment is the
        // dataset name and the remainder re-splits as service/type/file.
        dataset = asset_type.take().filter(|name| !name.is_empty());
        let rest = file.take().unwrap_or_default();
        let mut inner = rest.splitn(3, '/');
        service = inner.next().map(str::to_string);
        asset_type = inner.next().map(str::to_string);
        file = inner.next().map(str::to_string);
    }

    if file.is_none() {
        // Three segments and no dataset marker: a top-level fields file.
        // The type slot holds the file name and the service is dropped.
        file = asset_type.take();
        asset_type = Some(FIELDS_TYPE.to_string());
        service = Some(String::new());
    }

    AssetParts {
        pkgkey,
        service: service.unwrap_or_default(),
        asset_type: asset_type.unwrap_or_default(),
        file: file.unwrap_or_default(),
        dataset,
        path: path.to_string(),
    }
}
