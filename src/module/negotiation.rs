//! Port config synthesis and negotiation against port capabilities

use crate::error::{ModuleError, ModuleResult};
use crate::protocol::{AudioPort, AudioPortConfig};

/// Builds a config from the first profile, channel mask and sample rate
/// declared by the port.
pub fn generate_default_port_config(port: &AudioPort) -> ModuleResult<AudioPortConfig> {
    let profile = port.profiles.first().ok_or_else(|| {
        tracing::error!("generate_default_port_config: port {} has no profiles", port.id);
        ModuleError::illegal_argument(format!("port {} has no profiles", port.id))
    })?;
    let channel_mask = profile.channel_masks.first().ok_or_else(|| {
        tracing::error!(
            "generate_default_port_config: the first profile in port {} has no channel masks",
            port.id
        );
        ModuleError::illegal_argument(format!(
            "the first profile in port {} has no channel masks",
            port.id
        ))
    })?;
    let sample_rate = profile.sample_rates.first().ok_or_else(|| {
        tracing::error!(
            "generate_default_port_config: the first profile in port {} has no sample rates",
            port.id
        );
        ModuleError::illegal_argument(format!(
            "the first profile in port {} has no sample rates",
            port.id
        ))
    })?;

    Ok(AudioPortConfig {
        id: 0,
        port_id: port.id,
        sample_rate: Some(*sample_rate),
        channel_mask: Some(*channel_mask),
        format: Some(profile.format.clone()),
        gain: None,
        flags: Some(port.flags),
        ext: port.ext.clone(),
    })
}

/// How a requested config compares with what the port can do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Negotiation {
    /// No requested field contradicts the port's capabilities
    pub is_valid: bool,
    /// Flags, format, channel mask and sample rate were all given
    pub is_fully_specified: bool,
}

/// Merges the fields present in `requested` into `suggested`.
///
/// Every field is checked even after a mismatch so that each violation gets
/// logged. Fails only if the format carried by `suggested` is no longer
/// supported by the port at all.
pub fn negotiate(
    port: &AudioPort,
    requested: &AudioPortConfig,
    suggested: &mut AudioPortConfig,
) -> ModuleResult<Negotiation> {
    let mut outcome = Negotiation {
        is_valid: true,
        is_fully_specified: true,
    };

    match requested.flags {
        Some(flags) if flags == port.flags => suggested.flags = Some(flags),
        Some(flags) => {
            tracing::warn!(
                "set_audio_port_config: requested flags {:?} do not match port {} flags {:?}",
                flags,
                port.id,
                port.flags
            );
            outcome.is_valid = false;
        }
        None => outcome.is_fully_specified = false,
    }

    match &requested.format {
        Some(format) if port.find_profile(format).is_some() => {
            suggested.format = Some(format.clone());
        }
        Some(format) => {
            tracing::warn!(
                "set_audio_port_config: requested format {:?} is not found in port {} profiles",
                format,
                port.id
            );
            outcome.is_valid = false;
        }
        None => outcome.is_fully_specified = false,
    }

    let profile = suggested
        .format
        .as_ref()
        .and_then(|format| port.find_profile(format))
        .ok_or_else(|| {
            tracing::error!(
                "set_audio_port_config: port {} does not support format {:?} anymore",
                port.id,
                suggested.format
            );
            ModuleError::illegal_argument(format!(
                "port {} does not support format {:?} anymore",
                port.id, suggested.format
            ))
        })?;

    match requested.channel_mask {
        Some(mask) if profile.channel_masks.contains(&mask) => suggested.channel_mask = Some(mask),
        Some(mask) => {
            tracing::warn!(
                "set_audio_port_config: requested channel mask {:?} is not supported for the format {:?} by port {}",
                mask,
                profile.format,
                port.id
            );
            outcome.is_valid = false;
        }
        None => outcome.is_fully_specified = false,
    }

    match requested.sample_rate {
        Some(rate) if profile.sample_rates.contains(&rate) => suggested.sample_rate = Some(rate),
        Some(rate) => {
            tracing::warn!(
                "set_audio_port_config: requested sample rate {} is not supported for the format {:?} by port {}",
                rate,
                profile.format,
                port.id
            );
            outcome.is_valid = false;
        }
        None => outcome.is_fully_specified = false,
    }

    // No capability check for gain.
    if let Some(gain) = &requested.gain {
        suggested.gain = Some(gain.clone());
    }

    Ok(outcome)
}
