use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::host::ModuleRef;
use crate::types::{Fingerprint, ModuleEnhancementPlan};

/// Fingerprints of the last successful enhancement, per module.
#[derive(Debug, Default)]
pub struct ValidityCache {
    entries: HashMap<ModuleRef, CacheEntry>,
    cache_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CacheEntry {
    module: ModuleRef,
    fingerprints: BTreeMap<PathBuf, Fingerprint>,
    /// Classes the enhancer changed when the entry was recorded.
    enhanced: usize,
    timestamp: SystemTime,
}

impl ValidityCache {
    pub fn new(cache_dir: Option<PathBuf>) -> Self {
        Self {
            entries: HashMap::new(),
            cache_dir,
        }
    }

    /// Opens the cache and reads whatever was persisted under `cache_dir`.
    pub fn open(cache_dir: PathBuf) -> Result<Self> {
        let mut cache = Self::new(Some(cache_dir));
        cache.load_from_disk()?;
        Ok(cache)
    }

    pub fn cache_dir(&self) -> Option<&Path> {
        self.cache_dir.as_deref()
    }

    /// True when every unit of the plan carries the fingerprint recorded for it
    /// and nothing was added or removed since.
    pub fn is_up_to_date(&self, plan: &ModuleEnhancementPlan) -> bool {
        let Some(entry) = self.entries.get(&plan.module) else {
            return false;
        };

        let mut count = 0;
        for unit in plan.units() {
            count += 1;
            match entry.fingerprints.get(&unit.target) {
                Some(recorded) if *recorded == unit.fingerprint => {}
                _ => return false,
            }
        }
        count == entry.fingerprints.len()
    }

    /// Records the plan's targets as they are on disk now, with the number of
    /// classes enhanced. Called after the enhancer has rewritten the class files.
    pub fn record(&mut self, plan: &ModuleEnhancementPlan, enhanced: usize) {
        let fingerprints = plan
            .units()
            .map(|unit| (unit.target.clone(), unit.current_fingerprint()))
            .collect();
        self.entries.insert(
            plan.module.clone(),
            CacheEntry {
                module: plan.module.clone(),
                fingerprints,
                enhanced,
                timestamp: SystemTime::now(),
            },
        );
    }

    /// Enhanced count stored with the module's last recorded run.
    pub fn recorded_count(&self, module: &ModuleRef) -> Option<usize> {
        self.entries.get(module).map(|entry| entry.enhanced)
    }

    pub fn invalidate(&mut self, module: &ModuleRef) {
        self.entries.remove(module);
        if let Some(path) = self.entry_path(module) {
            match std::fs::remove_file(&path) {
                Ok(()) => debug!("Removed cache entry {}", path.display()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => warn!("Failed to remove cache entry {}: {}", path.display(), e),
            }
        }
    }

    pub fn contains(&self, module: &ModuleRef) -> bool {
        self.entries.contains_key(module)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) -> Result<()> {
        self.entries.clear();

        if let Some(ref cache_dir) = self.cache_dir {
            if cache_dir.exists() {
                std::fs::remove_dir_all(cache_dir)?;
            }
        }
        Ok(())
    }

    pub fn load_from_disk(&mut self) -> Result<()> {
        let Some(ref cache_dir) = self.cache_dir else {
            return Ok(());
        };
        if !cache_dir.exists() {
            return Ok(());
        }

        for entry in std::fs::read_dir(cache_dir)? {
            let path = entry?.path();
            if path.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }
            let parsed = std::fs::read_to_string(&path)
                .ok()
                .and_then(|contents| serde_json::from_str::<CacheEntry>(&contents).ok());
            match parsed {
                Some(cache_entry) => {
                    self.entries.insert(cache_entry.module.clone(), cache_entry);
                }
                None => debug!("Ignoring unreadable cache entry {}", path.display()),
            }
        }

        Ok(())
    }

    /// Writes every entry. A failure here fails the pass.
    pub fn save_to_disk(&self) -> Result<()> {
        let Some(ref cache_dir) = self.cache_dir else {
            return Ok(());
        };
        std::fs::create_dir_all(cache_dir)?;

        for (module, entry) in &self.entries {
            let path = cache_dir.join(format!("{}.json", encode_cache_filename(module)));
            let contents = serde_json::to_string_pretty(entry).map_err(|e| {
                Error::Other(format!("Failed to serialize cache entry for {module}: {e}"))
            })?;
            std::fs::write(path, contents)?;
        }

        debug!("Saved {} cache entries to {}", self.entries.len(), cache_dir.display());
        Ok(())
    }

    fn entry_path(&self, module: &ModuleRef) -> Option<PathBuf> {
        self.cache_dir
            .as_ref()
            .map(|dir| dir.join(format!("{}.json", encode_cache_filename(module))))
    }
}

/// Percent-escapes every byte outside `[A-Za-z0-9._-]`, so distinct module
/// names never share a file.
fn encode_cache_filename(module: &ModuleRef) -> String {
    let mut encoded = String::with_capacity(module.name().len());
    for byte in module.name().bytes() {
        match byte {
            b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'.' | b'_' | b'-' => {
                encoded.push(byte as char)
            }
            _ => encoded.push_str(&format!("%{byte:02X}")),
        }
    }
    encoded
}
