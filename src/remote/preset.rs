// ABOUTME: Mastering preset sent with every new job and the file naming it needs
// ABOUTME: Derives base name, extension and display name from the local path

use serde::Serialize;
use std::path::Path;

use crate::error::MasterError;

/// Names the service expects for an uploaded file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioFileName {
    /// File name up to its first dot
    pub base: String,
    /// Text after the last dot, case preserved
    pub extension: String,
    pub human: String,
}

impl AudioFileName {
    pub fn from_path(path: &Path) -> Result<Self, MasterError> {
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| {
                MasterError::InvalidInput(format!("{} has no usable file name", path.display()))
            })?;

        let base = file_name.split('.').next().unwrap_or_default();
        let extension = match file_name.rfind('.') {
            Some(idx) => &file_name[idx + 1..],
            None => "",
        };

        if base.is_empty() || extension.is_empty() {
            return Err(MasterError::InvalidInput(format!(
                "filename or extension is empty: {}",
                file_name
            )));
        }

        Ok(Self {
            base: base.to_string(),
            extension: extension.to_string(),
            human: title_case(base),
        })
    }
}

fn is_word_separator(c: char) -> bool {
    if c.is_ascii() {
        !(c.is_ascii_alphanumeric() || c == '_')
    } else {
        c.is_whitespace()
    }
}

/// Upper-cases the first letter of every word.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut at_word_start = true;
    for c in s.chars() {
        if at_word_start {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        at_word_start = is_word_separator(c);
    }
    out
}

#[derive(Debug, Clone, Serialize)]
pub struct MasteringPreset {
    pub remaster: bool,
    pub engine: u32,
    pub strength: &'static str,
    pub name: String,
    pub ext: String,
    pub reference: ReferenceTrack,
    pub equalization: Equalization,
    pub stereowidth: &'static str,
    pub volume: &'static str,
    pub genre: &'static str,
    pub options: ChannelOptions,
    pub effects: Effects,
    pub eq: EqIntensity,
    pub compressor: Compressor,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReferenceTrack {
    pub enabled: bool,
    pub ratio: u32,
    pub width: u32,
    pub name: &'static str,
    pub ext: &'static str,
    pub bass: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Equalization {
    pub low: &'static str,
    pub mid: &'static str,
    pub high: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChannelOptions {
    pub channels: &'static str,
    pub ultralowbassreduction: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct Effects {
    pub reverb: &'static str,
    pub echo: &'static str,
    pub chorus: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct EqIntensity {
    pub intensity: u32,
    pub i1: u32,
    pub i2: u32,
    pub i3: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct Compressor {
    pub intensity: u32,
    pub limiter: u32,
}

impl MasteringPreset {
    /// Engine 9, normal settings, stereo, bass reduction, no reference or effects.
    pub fn standard(name: &str, ext: &str) -> Self {
        Self {
            remaster: false,
            engine: 9,
            strength: "normal",
            name: name.to_string(),
            ext: ext.to_string(),
            reference: ReferenceTrack {
                enabled: false,
                ratio: 50,
                width: 14,
                name: "",
                ext: "",
                bass: 0.5,
            },
            equalization: Equalization {
                low: "normal",
                mid: "normal",
                high: "normal",
            },
            stereowidth: "normal",
            volume: "normal",
            genre: "",
            options: ChannelOptions {
                channels: "stereo",
                ultralowbassreduction: true,
            },
            effects: Effects {
                reverb: "none",
                echo: "none",
                chorus: "none",
            },
            eq: EqIntensity {
                intensity: 100,
                i1: 100,
                i2: 100,
                i3: 100,
            },
            compressor: Compressor {
                intensity: 100,
                limiter: 0,
            },
        }
    }

    pub fn to_json(&self) -> Result<String, MasterError> {
        serde_json::to_string(self)
            .map_err(|e| MasterError::InvalidInput(format!("can't encode preset: {}", e)))
    }
}

/// URL-encoded body of a `new-master` registration.
pub fn registration_form(
    file: &AudioFileName,
    preset: &MasteringPreset,
    unix_time: i64,
) -> Result<Vec<(&'static str, String)>, MasterError> {
    Ok(vec![
        ("actid", String::new()),
        ("acttoken", String::new()),
        ("action", "new-master".to_string()),
        ("key", String::new()),
        ("fname", file.base.clone()),
        ("human_fname", file.human.clone()),
        ("fext", file.extension.clone()),
        ("vtime", unix_time.to_string()),
        ("msto", preset.to_json()?),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uppercase_extension_is_preserved() {
        let name = AudioFileName::from_path(Path::new("/music/song.WAV")).unwrap();
        assert_eq!(name.base, "song");
        assert_eq!(name.extension, "WAV");
        assert_eq!(name.human, "Song");
    }

    #[test]
    fn test_base_stops_at_first_dot() {
        let name = AudioFileName::from_path(Path::new("take.2.final.mp3")).unwrap();
        assert_eq!(name.base, "take");
        assert_eq!(name.extension, "mp3");
    }

    #[test]
    fn test_empty_parts_are_rejected() {
        for path in ["song", ".wav", "song.", "/tmp/", ""] {
            let result = AudioFileName::from_path(Path::new(path));
            assert!(
                matches!(result, Err(MasterError::InvalidInput(_))),
                "{} should be rejected",
                path
            );
        }
    }

    #[test]
    fn test_title_case_words() {
        assert_eq!(title_case("my first song"), "My First Song");
        assert_eq!(title_case("late-night_mix"), "Late-Night_mix");
        assert_eq!(title_case("élan vital"), "Élan Vital");
        assert_eq!(title_case(""), "");
    }

    #[test]
    fn test_preset_matches_web_client_payload() {
        let json = MasteringPreset::standard("song", "wav").to_json().unwrap();
        assert_eq!(
            json,
            r#"{"remaster":false,"engine":9,"strength":"normal","name":"song","ext":"wav","reference":{"enabled":false,"ratio":50,"width":14,"name":"","ext":"","bass":0.5},"equalization":{"low":"normal","mid":"normal","high":"normal"},"stereowidth":"normal","volume":"normal","genre":"","options":{"channels":"stereo","ultralowbassreduction":true},"effects":{"reverb":"none","echo":"none","chorus":"none"},"eq":{"intensity":100,"i1":100,"i2":100,"i3":100},"compressor":{"intensity":100,"limiter":0}}"#
        );
    }

    #[test]
    fn test_preset_carries_name_and_ext_verbatim() {
        for (name, ext) in [
            ("song", "WAV"),
            ("Grüße aus Köln", "flac"),
            ("quote\"d", "mp3"),
            ("tab\there", "aiff"),
        ] {
            let json = MasteringPreset::standard(name, ext).to_json().unwrap();
            let value: serde_json::Value = serde_json::from_str(&json).unwrap();
            assert_eq!(value["name"], name);
            assert_eq!(value["ext"], ext);
        }
    }

    #[test]
    fn test_registration_form_fields() {
        let file = AudioFileName::from_path(Path::new("song.WAV")).unwrap();
        let preset = MasteringPreset::standard(&file.base, &file.extension);
        let form = registration_form(&file, &preset, 1_588_291_200).unwrap();

        let get = |key: &str| {
            form.iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.as_str())
                .unwrap()
        };
        assert_eq!(get("action"), "new-master");
        assert_eq!(get("fname"), "song");
        assert_eq!(get("human_fname"), "Song");
        assert_eq!(get("fext"), "WAV");
        assert_eq!(get("vtime"), "1588291200");
        assert_eq!(get("actid"), "");
        assert!(get("msto").contains(r#""name":"song","ext":"WAV""#));
    }
}
