use anyhow::{Context, Result};
use glob::Pattern;
use std::collections::BTreeMap;
use std::path::Path;

/// Kind of source artifact read from an org snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    /// `*.cls` files, keyed by class name
    ApexClass,
    /// Files inside `aura/<Bundle>/`, keyed by bundle and definition type
    Aura,
}

/// Aura definition types by the file-name remainder after the bundle name
const AURA_SUFFIXES: &[(&str, &str)] = &[
    ("Controller.js", "CONTROLLER"),
    ("Renderer.js", "RENDERER"),
    ("Helper.js", "HELPER"),
    (".auradoc", "DOCUMENTATION"),
    (".design", "DESIGN"),
    (".tokens", "TOKENS"),
    (".intf", "INTERFACE"),
    (".cmp", "COMPONENT"),
    (".app", "APPLICATION"),
    (".evt", "EVENT"),
    (".css", "STYLE"),
    (".svg", "SVG"),
];

/// Map an Aura bundle file to its definition type.
/// Returns None for metadata files and names that don't follow the bundle convention.
pub fn aura_def_type(bundle: &str, file_name: &str) -> Option<&'static str> {
    let suffix = file_name.strip_prefix(bundle)?;
    AURA_SUFFIXES
        .iter()
        .find(|(s, _)| *s == suffix)
        .map(|(_, def_type)| *def_type)
}

/// Artifact key for an Aura definition
pub fn aura_key(bundle: &str, def_type: &str) -> String {
    format!("{bundle}/{def_type}")
}

/// Load all artifacts of `kind` below `root` into a name → body map.
///
/// The snapshot layout is the Salesforce source format, at any depth:
/// `.../classes/Foo.cls` and `.../aura/Bundle/BundleController.js`.
pub fn load_snapshot(
    root: &Path,
    kind: ArtifactKind,
    excluded_aura_types: &[String],
) -> Result<BTreeMap<String, String>> {
    if !root.is_dir() {
        anyhow::bail!("Snapshot directory not found: {}", root.display());
    }

    let base = Pattern::escape(&root.to_string_lossy());
    let pattern = match kind {
        ArtifactKind::ApexClass => format!("{base}/**/*.cls"),
        ArtifactKind::Aura => format!("{base}/**/aura/*/*"),
    };

    let mut artifacts = BTreeMap::new();
    for entry in glob::glob(&pattern).context("Invalid snapshot glob pattern")? {
        let path = entry.context("Failed to read snapshot entry")?;
        if !path.is_file() {
            continue;
        }
        let Some(key) = artifact_key(&path, kind, excluded_aura_types) else {
            continue;
        };
        let body = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        if artifacts.insert(key.clone(), body).is_some() {
            log::warn!("Duplicate artifact {}; keeping {}", key, path.display());
        }
    }

    log::info!(
        "Loaded {} {} artifacts from {}",
        artifacts.len(),
        match kind {
            ArtifactKind::ApexClass => "Apex class",
            ArtifactKind::Aura => "Aura",
        },
        root.display()
    );
    Ok(artifacts)
}

fn artifact_key(path: &Path, kind: ArtifactKind, excluded_aura_types: &[String]) -> Option<String> {
    let file_name = path.file_name()?.to_str()?;
    match kind {
        ArtifactKind::ApexClass => Some(file_name.strip_suffix(".cls")?.to_string()),
        ArtifactKind::Aura => {
            if file_name.ends_with("-meta.xml") {
                return None;
            }
            let bundle = path.parent()?.file_name()?.to_str()?;
            let Some(def_type) = aura_def_type(bundle, file_name) else {
                log::debug!("Skipping unrecognised Aura file {}", path.display());
                return None;
            };
            if excluded_aura_types
                .iter()
                .any(|t| t.eq_ignore_ascii_case(def_type))
            {
                return None;
            }
            Some(aura_key(bundle, def_type))
        }
    }
}
