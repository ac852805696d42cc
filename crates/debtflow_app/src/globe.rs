// SPDX-License-Identifier: MIT OR Apache-2.0
//! Globe highlight model.
//!
//! The globe follows the highlight channel: it titles itself with the
//! highlighted country and turns to face it, or back to the middle of
//! Europe when nothing is highlighted.

use debtflow_graph::{CountryId, CountryRegistry};
use debtflow_sequencer::{CountryChanged, FlowPlayer, FrameClock, Interpolation, SubscriptionId};
use indexmap::IndexMap;
use std::cell::RefCell;
use std::rc::Rc;

/// Title shown while nothing is highlighted
pub const DEFAULT_TITLE: &str = "Hover over a bank lenders bar";

/// Geometric centre of the EU (longitude, latitude)
pub const DEFAULT_CENTROID: Centroid = Centroid::new(9.901944, 49.843056);

/// Duration of a rotation tween
pub const ROTATION_DURATION_MS: f64 = 1000.0;

/// A point on the globe in degrees
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Centroid {
    /// Longitude
    pub lon: f64,
    /// Latitude
    pub lat: f64,
}

impl Centroid {
    /// Create a centroid
    pub const fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// Projection rotation that centres this point
    pub fn rotation(&self) -> [f64; 2] {
        [-self.lon, -self.lat]
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct RotationTween {
    from: [f64; 2],
    to: [f64; 2],
    /// Set on the first frame after the change
    started_at: Option<f64>,
}

/// Globe state driven by highlight changes
#[derive(Debug, Clone)]
pub struct Globe {
    names: IndexMap<CountryId, String>,
    centroids: IndexMap<CountryId, Centroid>,
    highlighted: Option<CountryId>,
    rotation: [f64; 2],
    tween: Option<RotationTween>,
}

impl Globe {
    /// Create a globe facing the default centroid
    pub fn new(registry: &CountryRegistry, centroids: IndexMap<CountryId, Centroid>) -> Self {
        Self {
            names: registry.countries().map(|c| (c.id, c.name.clone())).collect(),
            centroids,
            highlighted: None,
            rotation: DEFAULT_CENTROID.rotation(),
            tween: None,
        }
    }

    /// Subscribe a shared globe to a player's highlight channel
    pub fn attach<C: FrameClock>(globe: &Rc<RefCell<Globe>>, player: &mut FlowPlayer<C>) -> SubscriptionId {
        let globe = Rc::clone(globe);
        player.subscribe(move |event| globe.borrow_mut().on_highlight_changed(event))
    }

    /// React to a highlight change: retitle and start turning
    pub fn on_highlight_changed(&mut self, event: CountryChanged) {
        self.highlighted = event.0.filter(|id| self.names.contains_key(id));

        let target = match self.highlighted {
            Some(id) => self.centroids.get(&id).copied().unwrap_or_else(|| {
                tracing::debug!("No centroid for {id}, facing the default");
                DEFAULT_CENTROID
            }),
            None => DEFAULT_CENTROID,
        };

        self.tween = Some(RotationTween {
            from: self.rotation,
            to: target.rotation(),
            started_at: None,
        });
    }

    /// Move the rotation tween to frame time `now`
    pub fn update(&mut self, now: f64) {
        let Some(tween) = self.tween.as_mut() else {
            return;
        };
        let started_at = *tween.started_at.get_or_insert(now);
        let t = ((now - started_at) / ROTATION_DURATION_MS).clamp(0.0, 1.0);
        if t >= 1.0 {
            self.rotation = tween.to;
            self.tween = None;
            return;
        }

        let eased = Interpolation::ease_cubic_in_out(t);
        self.rotation = [
            Interpolation::lerp(tween.from[0], tween.to[0], eased),
            Interpolation::lerp(tween.from[1], tween.to[1], eased),
        ];
    }

    /// Title text
    pub fn title(&self) -> &str {
        self.highlighted
            .and_then(|id| self.names.get(&id))
            .map_or(DEFAULT_TITLE, String::as_str)
    }

    /// Current projection rotation `[lambda, phi]`
    pub fn rotation(&self) -> [f64; 2] {
        self.rotation
    }

    /// Whether a rotation is in progress
    pub fn is_turning(&self) -> bool {
        self.tween.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn globe() -> Globe {
        let mut centroids = IndexMap::new();
        centroids.insert(CountryId(392), Centroid::new(138.0, 37.6));
        Globe::new(&CountryRegistry::bis_default(), centroids)
    }

    #[test]
    fn test_starts_at_default() {
        let globe = globe();
        assert_eq!(globe.title(), DEFAULT_TITLE);
        assert_eq!(globe.rotation(), [-9.901944, -49.843056]);
        assert!(!globe.is_turning());
    }

    #[test]
    fn test_turns_to_highlight_over_one_second() {
        let mut globe = globe();
        globe.on_highlight_changed(CountryChanged(Some(CountryId(392))));
        assert_eq!(globe.title(), "Japan");

        globe.update(100.0);
        assert_eq!(globe.rotation(), DEFAULT_CENTROID.rotation());
        globe.update(600.0);
        let [lambda, _] = globe.rotation();
        assert!(lambda < -9.901944 && lambda > -138.0);
        globe.update(1100.0);
        assert_eq!(globe.rotation(), [-138.0, -37.6]);
        assert!(!globe.is_turning());
    }

    #[test]
    fn test_clear_returns_to_default() {
        let mut globe = globe();
        globe.on_highlight_changed(CountryChanged(Some(CountryId(392))));
        globe.update(0.0);
        globe.update(1000.0);
        globe.on_highlight_changed(CountryChanged(None));
        assert_eq!(globe.title(), DEFAULT_TITLE);
        globe.update(1000.0);
        globe.update(2000.0);
        assert_eq!(globe.rotation(), DEFAULT_CENTROID.rotation());
    }

    #[test]
    fn test_missing_centroid_faces_default() {
        let mut globe = globe();
        globe.on_highlight_changed(CountryChanged(Some(CountryId(250))));
        assert_eq!(globe.title(), "France");
        globe.update(0.0);
        globe.update(1000.0);
        assert_eq!(globe.rotation(), DEFAULT_CENTROID.rotation());
    }
}
