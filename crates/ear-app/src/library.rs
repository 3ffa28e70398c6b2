use std::path::Path;

use anyhow::{Context, Result};
use ear_core::{CoreError, ReferenceRecording, Sound, SoundLibrary};
use serde::Deserialize;

/// Manifest file shape:
///
/// ```toml
/// [[sound]]
/// name = "doorbell"
/// recordings = ["doorbell-1.wav", "doorbell-2.wav"]
/// flash = true
/// vibrate = false
/// ```
#[derive(Deserialize)]
struct ManifestFile {
    #[serde(default)]
    sound: Vec<SoundEntry>,
}

#[derive(Deserialize)]
struct SoundEntry {
    name: String,
    #[serde(default)]
    recordings: Vec<String>,
    #[serde(default)]
    flash: bool,
    #[serde(default)]
    vibrate: bool,
}

/// Sound library backed by a TOML manifest.
///
/// Recording paths in the manifest are resolved relative to the manifest's
/// own directory. Missing recording files are kept (the decoder resolves
/// them to the empty buffer at scan time) but warned about at load.
pub struct FileLibrary {
    sounds: Vec<Sound>,
}

impl FileLibrary {
    /// Load and validate a manifest.
    ///
    /// # Errors
    /// Returns an error if the manifest is missing, unparsable, or names a
    /// sound with an empty name.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CoreError::FileNotFound {
                path: path.display().to_string(),
            }
            .into());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot read library manifest {}", path.display()))?;
        let manifest: ManifestFile = toml::from_str(&content)
            .with_context(|| format!("TOML parse error in {}", path.display()))?;

        let base = path.parent().unwrap_or_else(|| Path::new("."));
        let mut sounds = Vec::with_capacity(manifest.sound.len());
        for entry in manifest.sound {
            if entry.name.trim().is_empty() {
                return Err(CoreError::Config("sound with empty name in manifest".into()).into());
            }
            let mut recordings = Vec::with_capacity(entry.recordings.len());
            for rel in entry.recordings {
                let resolved = base.join(rel);
                if !resolved.exists() {
                    log::warn!(
                        "recording {} for \"{}\" does not exist; it will never match",
                        resolved.display(),
                        entry.name
                    );
                }
                recordings.push(ReferenceRecording::new(resolved));
            }
            if recordings.is_empty() {
                log::warn!("sound \"{}\" has no recordings", entry.name);
            }
            let mut sound = Sound::new(entry.name, recordings);
            sound.flash_when_recognized = entry.flash;
            sound.vibrate_when_recognized = entry.vibrate;
            sounds.push(sound);
        }

        Ok(Self { sounds })
    }

    #[must_use]
    pub fn sounds(&self) -> &[Sound] {
        &self.sounds
    }
}

impl SoundLibrary for FileLibrary {
    fn current_sounds(&self) -> Vec<Sound> {
        self.sounds.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_manifest(dir: &Path, content: &str) -> std::path::PathBuf {
        let path = dir.join("library.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn loads_sounds_in_manifest_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_manifest(
            dir.path(),
            r#"
                [[sound]]
                name = "doorbell"
                recordings = ["doorbell-1.wav", "doorbell-2.wav"]
                flash = true

                [[sound]]
                name = "oven timer"
                recordings = ["oven.wav"]
                vibrate = true
            "#,
        );

        let library = FileLibrary::load(&path).unwrap();
        let sounds = library.current_sounds();
        assert_eq!(sounds.len(), 2);
        assert_eq!(sounds[0].name, "doorbell");
        assert!(sounds[0].flash_when_recognized);
        assert!(!sounds[0].vibrate_when_recognized);
        assert_eq!(sounds[0].recordings.len(), 2);
        // Relative paths resolve against the manifest directory.
        assert_eq!(
            sounds[0].recordings[0].path,
            dir.path().join("doorbell-1.wav")
        );
        assert_eq!(sounds[1].name, "oven timer");
        assert!(sounds[1].vibrate_when_recognized);
    }

    #[test]
    fn empty_sound_name_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_manifest(dir.path(), "[[sound]]\nname = \"  \"\n");
        assert!(FileLibrary::load(&path).is_err());
    }

    #[test]
    fn missing_manifest_is_an_error() {
        assert!(FileLibrary::load(Path::new("/no/such/library.toml")).is_err());
    }

    #[test]
    fn empty_manifest_is_an_empty_library() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_manifest(dir.path(), "");
        let library = FileLibrary::load(&path).unwrap();
        assert!(library.current_sounds().is_empty());
    }
}
