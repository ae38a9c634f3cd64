//! The isolated rendering environment and its bootstrap page.

use courier_core::Coordinate;
use serde_json::{Value, json};

use crate::codec::{READY_FLAG, RESOURCE_FAILED_HOOK};

/// Default zoom level for a freshly mounted map.
pub const DEFAULT_ZOOM_LEVEL: u8 = 4;

/// A sandboxed map surface the host can only talk to by message passing.
///
/// Both operations are fire-and-forget. Outcomes come back later as raw
/// messages fed to [`crate::BridgeSession::receive`], or as resource
/// failures reported through [`crate::BridgeSession::resource_failed`].
pub trait Surface {
    /// Begin loading the map SDK from `resource_url`.
    fn load(&mut self, resource_url: &str);

    /// Run an encoded command script inside the surface.
    fn evaluate(&mut self, script: &str);
}

impl<S: Surface + ?Sized> Surface for &mut S {
    fn load(&mut self, resource_url: &str) {
        (**self).load(resource_url);
    }

    fn evaluate(&mut self, script: &str) {
        (**self).evaluate(script);
    }
}

/// A marker drawn as soon as the page initialises.
#[derive(Debug, Clone, PartialEq)]
pub struct InitialMarker {
    /// Marker position.
    pub at: Coordinate,
    /// Marker text.
    pub label: String,
}

/// Bootstrap document for a surface hosted in a webview.
///
/// The page loads the SDK, builds the map inside a `try`/`catch` and posts
/// `mapReady` or `mapError`. Uncaught errors are forwarded as `mapError`
/// and taps as `mapClick`. It defines the four command entry points and
/// raises the readiness flag checked by every encoded command. A failed
/// SDK load calls the [`RESOURCE_FAILED_HOOK`] function when the embedder
/// has defined one.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfacePage {
    /// Initial map centre.
    pub center: Coordinate,
    /// Markers drawn on load.
    pub markers: Vec<InitialMarker>,
    /// Whether to draw the courier's position dot at the centre.
    pub show_user_location: bool,
    /// SDK zoom level; smaller is closer.
    pub zoom_level: u8,
}

impl SurfacePage {
    /// A page centred on `center` with the user dot and no markers.
    #[must_use]
    pub const fn new(center: Coordinate) -> Self {
        Self {
            center,
            markers: Vec::new(),
            show_user_location: true,
            zoom_level: DEFAULT_ZOOM_LEVEL,
        }
    }

    /// Draw `markers` on load.
    #[must_use]
    pub fn with_markers(mut self, markers: Vec<InitialMarker>) -> Self {
        self.markers = markers;
        self
    }

    /// Toggle the user position dot.
    #[must_use]
    pub const fn with_user_location(mut self, show: bool) -> Self {
        self.show_user_location = show;
        self
    }

    /// Override the zoom level.
    #[must_use]
    pub const fn with_zoom_level(mut self, zoom_level: u8) -> Self {
        self.zoom_level = zoom_level;
        self
    }

    /// Render the HTML document that loads the SDK from `resource_url`.
    ///
    /// # Examples
    /// ```
    /// use courier_bridge::SurfacePage;
    /// use courier_core::Coordinate;
    ///
    /// let page = SurfacePage::new(Coordinate::new(37.5, 127.0)?);
    /// let html = page.render("https://maps.example.com/sdk.js");
    /// assert!(html.contains("https://maps.example.com/sdk.js"));
    /// assert!(html.contains("__courierSurfaceReady"));
    /// # Ok::<(), courier_core::CoordinateError>(())
    /// ```
    #[must_use]
    pub fn render(&self, resource_url: &str) -> String {
        let markers: Vec<Value> = self
            .markers
            .iter()
            .map(|m| json!({ "lat": m.at.lat(), "lng": m.at.lng(), "label": m.label }))
            .collect();
        let lat = self.center.lat().to_string();
        let lng = self.center.lng().to_string();
        let zoom = self.zoom_level.to_string();
        let markers = script_safe(&Value::Array(markers).to_string());
        let url = script_literal(resource_url);
        fill(
            PAGE_TEMPLATE,
            &[
                ("__READY_FLAG__", READY_FLAG),
                ("__RESOURCE_HOOK__", RESOURCE_FAILED_HOOK),
                ("__CENTER_LAT__", &lat),
                ("__CENTER_LNG__", &lng),
                ("__ZOOM_LEVEL__", &zoom),
                ("__SHOW_USER__", if self.show_user_location { "true" } else { "false" }),
                ("__MARKERS__", &markers),
                ("__RESOURCE_URL__", &url),
            ],
        )
    }
}

/// Replace each `__NAME__` slot in one pass. Substituted text is never
/// rescanned, so values may contain slot names.
fn fill(template: &str, slots: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("__") {
        let (head, tail) = rest.split_at(start);
        out.push_str(head);
        let slot = slots
            .iter()
            .find_map(|(name, value)| tail.strip_prefix(name).map(|after| (*value, after)));
        let (text, after) = slot.unwrap_or_else(|| tail.split_at(2));
        out.push_str(text);
        rest = after;
    }
    out.push_str(rest);
    out
}

/// A JSON string literal that cannot close the surrounding script element.
fn script_literal(text: &str) -> String {
    script_safe(&Value::from(text).to_string())
}

fn script_safe(json: &str) -> String {
    json.replace("</", "<\\/")
}

const PAGE_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0, maximum-scale=1.0, user-scalable=no">
  <style>
    * { margin: 0; padding: 0; }
    html, body, #map { width: 100%; height: 100%; }
  </style>
</head>
<body>
  <div id="map"></div>
  <script>
    var map = null;
    var markers = [];
    var polyline = null;
    window.__READY_FLAG__ = false;

    function post(message) {
      if (window.ReactNativeWebView) {
        window.ReactNativeWebView.postMessage(JSON.stringify(message));
      } else if (window.parent && window.parent !== window) {
        window.parent.postMessage(JSON.stringify(message), '*');
      }
    }

    window.onerror = function (message) {
      post({ type: 'mapError', message: String(message) });
      return false;
    };

    function moveTo(lat, lng) {
      map.setCenter(new kakao.maps.LatLng(lat, lng));
    }

    function addNumberedMarker(lat, lng, label) {
      var badge = document.createElement('div');
      badge.style.cssText = 'width:28px;height:28px;background:#2ecc71;border-radius:50%;' +
        'display:flex;align-items:center;justify-content:center;color:#fff;' +
        'font-weight:bold;font-size:13px;box-shadow:0 2px 6px rgba(0,0,0,0.3);' +
        'border:2px solid #fff;';
      badge.textContent = String(label);
      var overlay = new kakao.maps.CustomOverlay({
        position: new kakao.maps.LatLng(lat, lng),
        content: badge,
        yAnchor: 0.5,
        xAnchor: 0.5
      });
      overlay.setMap(map);
      markers.push(overlay);
    }

    function clearAllMarkers() {
      markers.forEach(function (m) { m.setMap(null); });
      markers = [];
    }

    function drawPolyline(points) {
      if (polyline) { polyline.setMap(null); }
      var path = points.map(function (p) { return new kakao.maps.LatLng(p.lat, p.lng); });
      polyline = new kakao.maps.Polyline({
        path: path,
        strokeWeight: 4,
        strokeColor: '#2ecc71',
        strokeOpacity: 0.8,
        strokeStyle: 'solid'
      });
      polyline.setMap(map);
      if (path.length > 0) {
        var bounds = new kakao.maps.LatLngBounds();
        path.forEach(function (p) { bounds.extend(p); });
        map.setBounds(bounds);
      }
    }

    function initialise() {
      try {
        var center = new kakao.maps.LatLng(__CENTER_LAT__, __CENTER_LNG__);
        map = new kakao.maps.Map(document.getElementById('map'), {
          center: center,
          level: __ZOOM_LEVEL__
        });
        map.addControl(new kakao.maps.ZoomControl(), kakao.maps.ControlPosition.RIGHT);

        if (__SHOW_USER__) {
          new kakao.maps.CustomOverlay({
            position: center,
            content: '<div style="width:16px;height:16px;background:#4285F4;border:3px solid #fff;border-radius:50%;box-shadow:0 0 6px rgba(66,133,244,0.5);"></div>',
            yAnchor: 0.5,
            xAnchor: 0.5
          }).setMap(map);
        }

        __MARKERS__.forEach(function (m, i) {
          addNumberedMarker(m.lat, m.lng, m.label || String(i + 1));
        });

        kakao.maps.event.addListener(map, 'click', function (mouseEvent) {
          var latlng = mouseEvent.latLng;
          post({ type: 'mapClick', lat: latlng.getLat(), lng: latlng.getLng() });
        });

        window.__READY_FLAG__ = true;
        post({ type: 'mapReady' });
      } catch (error) {
        post({ type: 'mapError', message: String(error && error.message || error) });
      }
    }

    var sdk = document.createElement('script');
    sdk.src = __RESOURCE_URL__;
    sdk.onload = function () {
      if (window.kakao && kakao.maps && typeof kakao.maps.load === 'function') {
        kakao.maps.load(initialise);
      } else {
        initialise();
      }
    };
    sdk.onerror = function () {
      var hook = window.__RESOURCE_HOOK__;
      if (typeof hook === 'function') {
        hook(String(sdk.src));
      }
    };
    document.head.appendChild(sdk);
  </script>
</body>
</html>
"#;
