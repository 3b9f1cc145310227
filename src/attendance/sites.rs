use anyhow::{Context, Result, bail};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One registered office location. The list is loaded once at startup and
/// never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OfficeSite {
    #[schema(example = "Pallikaranai")]
    pub name: String,

    #[schema(example = 12.94198577)]
    pub latitude: f64,

    #[schema(example = 80.21012198)]
    pub longitude: f64,

    #[schema(example = 200.0)]
    pub radius_meters: f64,
}

/// Registered sites used when OFFICE_SITES_PATH is not configured.
pub static DEFAULT_SITES: Lazy<Vec<OfficeSite>> = Lazy::new(|| {
    vec![
        OfficeSite {
            name: "Pallikaranai".to_string(),
            latitude: 12.94198577,
            longitude: 80.21012198,
            radius_meters: 200.0,
        },
        OfficeSite {
            name: "Guindy".to_string(),
            latitude: 13.0066485,
            longitude: 80.2204686,
            radius_meters: 150.0,
        },
    ]
});

/// Loads the office site list from `path`, or falls back to the built-in
/// list. The list order matters: overlapping sites are resolved by taking
/// the first match.
pub fn load_sites(path: Option<&str>) -> Result<Vec<OfficeSite>> {
    let sites: Vec<OfficeSite> = match path {
        Some(p) => {
            let raw = std::fs::read_to_string(p)
                .with_context(|| format!("failed to read office sites from {}", p))?;
            serde_json::from_str(&raw)
                .with_context(|| format!("failed to parse office sites from {}", p))?
        }
        None => DEFAULT_SITES.clone(),
    };

    validate_sites(&sites)?;
    Ok(sites)
}

fn validate_sites(sites: &[OfficeSite]) -> Result<()> {
    if sites.is_empty() {
        bail!("office site list must not be empty");
    }

    for site in sites {
        if !(site.radius_meters > 0.0) {
            bail!("office site '{}' has non-positive radius", site.name);
        }
        if !(-90.0..=90.0).contains(&site.latitude)
            || !(-180.0..=180.0).contains(&site.longitude)
        {
            bail!("office site '{}' has out-of-range coordinates", site.name);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn built_in_sites_pass_validation() {
        let sites = load_sites(None).unwrap();
        assert!(!sites.is_empty());
        assert_eq!(sites[0].name, "Pallikaranai");
    }

    #[test]
    fn site_json_shape() {
        let raw = r#"[
            {"name": "Velachery", "latitude": 12.9755, "longitude": 80.2207, "radius_meters": 120.0}
        ]"#;
        let sites: Vec<OfficeSite> = serde_json::from_str(raw).unwrap();
        assert!(validate_sites(&sites).is_ok());
        assert_eq!(sites[0].name, "Velachery");
    }

    #[test]
    fn zero_radius_rejected() {
        let sites = vec![OfficeSite {
            name: "Broken".to_string(),
            latitude: 0.0,
            longitude: 0.0,
            radius_meters: 0.0,
        }];
        assert!(validate_sites(&sites).is_err());
    }

    #[test]
    fn out_of_range_center_rejected() {
        let sites = vec![OfficeSite {
            name: "Broken".to_string(),
            latitude: 95.0,
            longitude: 10.0,
            radius_meters: 100.0,
        }];
        assert!(validate_sites(&sites).is_err());
    }

    #[test]
    fn empty_list_rejected() {
        assert!(validate_sites(&[]).is_err());
    }
}
