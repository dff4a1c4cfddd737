//! Threshold profiles.
//!
//! Every tunable constant in the pipeline lives here as a named field, so a
//! profile can be retuned without touching classification logic. Profiles
//! are TOML files in `~/.config/fingerspell/profiles`; a bundled default is
//! installed on first run and an `active` pointer file selects the profile.

use anyhow::{Result, anyhow};
use directories::UserDirs;
use log::info;
use serde::Deserialize;
use std::{fs, io::Write, path::PathBuf};
use thiserror::Error;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct Meta {
    pub name: Option<String>,
}

/// Finger-state estimation thresholds (per-frame up/down vote).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FingerThresholds {
    /// Thumb counts as extended when tip-to-index-MCP distance exceeds this
    /// multiple of the thumb-MCP-to-index-MCP distance.
    pub thumb_reach_ratio: f32,
    /// ...or when the IP-joint angle exceeds this (degrees). The two checks
    /// fail independently under different wrist rotations, so either alone
    /// is sufficient evidence.
    pub thumb_ip_angle: f32,
    /// Tip must be this multiple farther from the wrist than the PIP joint.
    pub tip_reach_ratio: f32,
    /// PIP-joint angle above which a finger reads as straight (degrees).
    pub pip_angle: f32,
}

impl Default for FingerThresholds {
    fn default() -> Self {
        Self {
            thumb_reach_ratio: 1.10,
            thumb_ip_angle: 120.0,
            tip_reach_ratio: 1.02,
            pip_angle: 120.0,
        }
    }
}

/// Letter disambiguation thresholds. All distances are in palm-width units,
/// all angles in degrees, all straightness values in [0, 1].
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClassifierThresholds {
    // -- index+middle group (V / U / R / H) --
    /// Straightness floor for the V/U "both fingers straight" check.
    pub vu_straightness: f32,
    /// PIP angle floor for V.
    pub v_angle: f32,
    /// PIP angle floor for U and W.
    pub uw_angle: f32,
    /// Index-middle spread above which a clean V is read.
    pub v_spread: f32,
    /// Index-middle spread above which the pose is at least V-like.
    pub v_min_spread: f32,
    /// Index-middle spread below which the fingers count as together (U).
    pub u_spread: f32,
    /// Tip gap below which crossed fingers can read as R.
    pub r_tip_gap: f32,
    /// Index-middle tip distance ceiling for H.
    pub h_tip_gap: f32,
    /// Max PIP-angle difference for the parallel-fingers H check.
    pub h_angle_diff: f32,

    // -- W --
    /// Straightness floor for W's three fingers.
    pub w_straightness: f32,
    /// Adjacent spread floor for W's separated fingers.
    pub w_spread: f32,

    // -- fist group (T / S / A / O / C) --
    /// Thumb-tip-to-index-PIP ceiling for T (thumb tucked between fingers).
    pub t_thumb_index_pip: f32,
    /// Thumb-tip-to-middle-PIP ceiling for S (thumb crossed over the fist).
    pub s_thumb_middle_pip: f32,
    /// Thumb-index tip distance below which the pose reads as A.
    pub a_thumb_index: f32,
    /// Straightness ceiling for A's curled fingers.
    pub a_curl: f32,
    /// Thumb-index range for the O circle.
    pub o_thumb_index_min: f32,
    pub o_thumb_index_max: f32,
    /// Straightness ceiling for O's bent fingers.
    pub o_curl: f32,
    /// C wants moderate curvature: straightness inside this band.
    pub c_curl_max: f32,
    pub c_curl_min: f32,

    // -- B --
    pub b_straightness: f32,
    pub b_spread: f32,

    // -- D / G / L --
    pub d_thumb_middle: f32,
    pub d_thumb_middle_loose: f32,
    pub d_index_angle: f32,
    /// Wrist-angle window between the thumb and index rays for G.
    pub g_angle_min: f32,
    pub g_angle_max: f32,
    pub g_angle_min_loose: f32,
    pub g_angle_max_loose: f32,
    pub g_thumb_index: f32,
    pub g_thumb_index_loose: f32,
    /// Horizontal/vertical tip-offset ratio above which the pose reads as L.
    pub l_aspect: f32,
    pub l_aspect_loose: f32,
    pub l_index_angle: f32,
    pub l_index_angle_loose: f32,

    // -- closed fist (M / N / E) --
    /// A knuckle counts as "tucked under" when the thumb tip is closer to it
    /// than this.
    pub mn_knuckle: f32,
    /// E with the thumb resting on the side of the fist.
    pub e_thumb_index: f32,

    // -- F --
    pub f_thumb_index: f32,
    pub f_thumb_index_loose: f32,
    pub f_middle_angle: f32,

    // -- I --
    pub i_pinky_angle: f32,

    // -- K --
    pub k_straightness: f32,
    pub k_spread: f32,
    pub k_thumb_middle_mcp: f32,

    // -- P / Q --
    pub pq_middle_angle: f32,
    pub p_index_angle: f32,
    pub p_middle_angle_loose: f32,

    // -- X --
    pub x_index_angle: f32,
    pub x_index_angle_loose: f32,

    // -- Y --
    pub y_thumb_pinky: f32,
    pub y_thumb_pinky_loose: f32,
}

impl Default for ClassifierThresholds {
    fn default() -> Self {
        Self {
            vu_straightness: 0.85,
            v_angle: 150.0,
            uw_angle: 145.0,
            v_spread: 0.22,
            v_min_spread: 0.18,
            u_spread: 0.20,
            r_tip_gap: 0.25,
            h_tip_gap: 0.80,
            h_angle_diff: 40.0,

            w_straightness: 0.85,
            w_spread: 0.15,

            t_thumb_index_pip: 0.30,
            s_thumb_middle_pip: 0.35,
            a_thumb_index: 0.35,
            a_curl: 0.70,
            o_thumb_index_min: 0.25,
            o_thumb_index_max: 0.42,
            o_curl: 0.75,
            c_curl_max: 0.80,
            c_curl_min: 0.50,

            b_straightness: 0.85,
            b_spread: 0.25,

            d_thumb_middle: 0.60,
            d_thumb_middle_loose: 0.70,
            d_index_angle: 115.0,
            g_angle_min: 55.0,
            g_angle_max: 130.0,
            g_angle_min_loose: 50.0,
            g_angle_max_loose: 135.0,
            g_thumb_index: 0.60,
            g_thumb_index_loose: 0.50,
            l_aspect: 1.0,
            l_aspect_loose: 0.8,
            l_index_angle: 115.0,
            l_index_angle_loose: 120.0,

            mn_knuckle: 0.50,
            e_thumb_index: 0.80,

            f_thumb_index: 0.50,
            f_thumb_index_loose: 0.60,
            f_middle_angle: 115.0,

            i_pinky_angle: 115.0,

            k_straightness: 0.82,
            k_spread: 0.15,
            k_thumb_middle_mcp: 0.30,

            pq_middle_angle: 115.0,
            p_index_angle: 160.0,
            p_middle_angle_loose: 120.0,

            x_index_angle: 160.0,
            x_index_angle_loose: 170.0,

            y_thumb_pinky: 0.95,
            y_thumb_pinky_loose: 0.80,
        }
    }
}

/// Temporal consensus thresholds.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StabilizerThresholds {
    /// Raw-letter history capacity.
    pub history_len: usize,
    /// Consensus window: most recent N history entries.
    pub window: usize,
    /// No decision until this many frames have been seen.
    pub min_history: usize,
    /// Occurrences in the window for a full-confidence lock.
    pub full_consensus: usize,
    /// Occurrences for the discounted middle tier.
    pub partial_consensus: usize,
    /// Consistency bonus = (count / window) * this weight.
    pub consistency_weight: f32,
    /// Stability bonus per consecutive stable frame, and its cap.
    pub stability_step: f32,
    pub stability_cap: f32,
    /// Middle-tier confidence discount.
    pub partial_discount: f32,
    /// Quality multiplier bands: below `low_base` the multiplier is
    /// `low_mult`, below `mid_base` it is `mid_mult`, else 1.0.
    pub low_base: f32,
    pub low_mult: f32,
    pub mid_base: f32,
    pub mid_mult: f32,
    /// Minimum fused confidence to emit a stable letter.
    pub emit_min: f32,
}

impl Default for StabilizerThresholds {
    fn default() -> Self {
        Self {
            history_len: 10,
            window: 7,
            min_history: 3,
            full_consensus: 3,
            partial_consensus: 2,
            consistency_weight: 0.15,
            stability_step: 0.03,
            stability_cap: 0.15,
            partial_discount: 0.75,
            low_base: 0.70,
            low_mult: 0.85,
            mid_base: 0.85,
            mid_mult: 0.95,
            emit_min: 0.65,
        }
    }
}

/// Landmark jitter-filter thresholds.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FilterThresholds {
    /// Reject a frame when mean landmark displacement exceeds this fraction
    /// of hand size.
    pub outlier_frac: f32,
    /// Smoothing buffer capacity.
    pub buffer_len: usize,
    /// Pass raw frames through until this many frames are buffered.
    pub min_smooth_frames: usize,
    /// Steady when the last `steady_window` movements are all below this
    /// fraction of hand size.
    pub steady_frac: f32,
    pub steady_window: usize,
}

impl Default for FilterThresholds {
    fn default() -> Self {
        Self {
            outlier_frac: 0.15,
            buffer_len: 7,
            min_smooth_frames: 3,
            steady_frac: 0.15,
            steady_window: 3,
        }
    }
}

/// Palm-vs-back heuristic threshold.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OrientationThresholds {
    /// Back of hand when the thumb tip's horizontal offset from the wrist is
    /// below this fraction of the knuckle span.
    pub thumb_offset_frac: f32,
}

impl Default for OrientationThresholds {
    fn default() -> Self {
        Self {
            thumb_offset_frac: 0.3,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Profile {
    pub meta: Meta,
    pub fingers: FingerThresholds,
    pub classifier: ClassifierThresholds,
    pub stabilizer: StabilizerThresholds,
    pub filter: FilterThresholds,
    pub orientation: OrientationThresholds,
}

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("{field} must be in (0, 1), got {value}")]
    FractionOutOfRange { field: &'static str, value: f32 },
    #[error("{field} must be positive")]
    ZeroLength { field: &'static str },
    #[error("stabilizer window {window} exceeds history capacity {history}")]
    WindowTooLarge { window: usize, history: usize },
    #[error("partial consensus {partial} must be below full consensus {full}")]
    ConsensusInverted { partial: usize, full: usize },
}

pub fn validate_profile(p: &Profile) -> Result<(), ProfileError> {
    let fractions = [
        ("filter.outlier_frac", p.filter.outlier_frac),
        ("filter.steady_frac", p.filter.steady_frac),
        ("stabilizer.emit_min", p.stabilizer.emit_min),
        (
            "orientation.thumb_offset_frac",
            p.orientation.thumb_offset_frac,
        ),
    ];
    for (field, value) in fractions {
        if value <= 0.0 || value >= 1.0 {
            return Err(ProfileError::FractionOutOfRange { field, value });
        }
    }
    if p.filter.buffer_len == 0 {
        return Err(ProfileError::ZeroLength {
            field: "filter.buffer_len",
        });
    }
    if p.stabilizer.history_len == 0 || p.stabilizer.window == 0 {
        return Err(ProfileError::ZeroLength {
            field: "stabilizer.window",
        });
    }
    if p.stabilizer.window > p.stabilizer.history_len {
        return Err(ProfileError::WindowTooLarge {
            window: p.stabilizer.window,
            history: p.stabilizer.history_len,
        });
    }
    if p.stabilizer.partial_consensus >= p.stabilizer.full_consensus {
        return Err(ProfileError::ConsensusInverted {
            partial: p.stabilizer.partial_consensus,
            full: p.stabilizer.full_consensus,
        });
    }
    Ok(())
}

fn config_dir() -> PathBuf {
    let home = UserDirs::new()
        .map(|d| d.home_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."));
    home.join(".config").join("fingerspell")
}

fn profiles_dir() -> PathBuf {
    config_dir().join("profiles")
}

fn active_ptr_path() -> PathBuf {
    config_dir().join("active")
}

fn default_profile_text() -> &'static str {
    include_str!("../profiles/default.toml")
}

/// On-disk profile state: the active profile plus the paths around it.
#[derive(Debug, Clone)]
pub struct ConfigState {
    pub active_name: String,
    pub profile: Profile,
    pub profiles_dir: PathBuf,
    pub active_ptr: PathBuf,
}

impl ConfigState {
    pub fn load_or_install_default() -> Result<Self> {
        let profdir = profiles_dir();
        fs::create_dir_all(&profdir)?;

        let def_path = profdir.join("default.toml");
        if !def_path.exists() {
            fs::write(&def_path, default_profile_text())?;
            info!("installed default profile at {}", def_path.display());
        }

        let active_ptr = active_ptr_path();
        if !active_ptr.exists() {
            let mut f = fs::File::create(&active_ptr)?;
            f.write_all(b"default")?;
        }

        let active_name = fs::read_to_string(&active_ptr)?.trim().to_string();
        let profile = Self::load_profile(&active_name)?;

        Ok(Self {
            active_name,
            profile,
            profiles_dir: profdir,
            active_ptr,
        })
    }

    pub fn set_active(&mut self, name: &str) -> Result<()> {
        let p = self.profiles_dir.join(format!("{name}.toml"));
        if !p.exists() {
            return Err(anyhow!("profile not found: {}", p.display()));
        }
        fs::write(&self.active_ptr, name.as_bytes())?;
        self.active_name = name.to_string();
        self.profile = Self::load_profile(name)?;
        Ok(())
    }

    pub fn list_profiles(&self) -> Vec<String> {
        let mut v = Vec::new();
        if let Ok(rd) = fs::read_dir(&self.profiles_dir) {
            for e in rd.flatten() {
                if e.path().extension().is_some_and(|ext| ext == "toml") {
                    if let Some(stem) = e.path().file_stem().and_then(|s| s.to_str()) {
                        v.push(stem.to_string());
                    }
                }
            }
        }
        v.sort();
        v
    }

    pub fn load_profile(name: &str) -> Result<Profile> {
        let path = profiles_dir().join(format!("{name}.toml"));
        let txt = fs::read_to_string(&path)
            .map_err(|e| anyhow!("failed to read {}: {e}", path.display()))?;
        let profile: Profile =
            toml::from_str(&txt).map_err(|e| anyhow!("failed to parse {}: {e}", path.display()))?;
        validate_profile(&profile)?;
        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_profile_is_valid() {
        let p = Profile::default();
        validate_profile(&p).unwrap();
    }

    #[test]
    fn bundled_profile_parses_and_validates() {
        let p: Profile = toml::from_str(default_profile_text()).unwrap();
        validate_profile(&p).unwrap();
        assert_eq!(p.meta.name.as_deref(), Some("default"));
    }

    #[test]
    fn partial_profile_falls_back_to_defaults() {
        let p: Profile = toml::from_str(
            r#"
            [stabilizer]
            full_consensus = 4
            "#,
        )
        .unwrap();
        assert_eq!(p.stabilizer.full_consensus, 4);
        assert_eq!(p.stabilizer.window, 7);
        assert_eq!(p.filter.buffer_len, 7);
    }

    #[test]
    fn bad_fraction_is_rejected() {
        let mut p = Profile::default();
        p.filter.outlier_frac = 1.5;
        assert!(matches!(
            validate_profile(&p),
            Err(ProfileError::FractionOutOfRange { .. })
        ));
    }

    #[test]
    fn inverted_consensus_is_rejected() {
        let mut p = Profile::default();
        p.stabilizer.partial_consensus = 3;
        assert!(matches!(
            validate_profile(&p),
            Err(ProfileError::ConsensusInverted { .. })
        ));
    }

    #[test]
    fn oversized_window_is_rejected() {
        let mut p = Profile::default();
        p.stabilizer.window = 20;
        assert!(matches!(
            validate_profile(&p),
            Err(ProfileError::WindowTooLarge { .. })
        ));
    }
}
