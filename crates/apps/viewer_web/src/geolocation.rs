use foundation::LngLat;
use scene::{GeolocationOptions, GeolocationOutcome, GeolocationProvider};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;

#[wasm_bindgen(inline_js = "
export function gis_locate(highAccuracy, timeoutMs, maximumAgeMs) {
    return new Promise((resolve) => {
        if (typeof navigator === 'undefined' || !('geolocation' in navigator)) {
            resolve({ status: 'unsupported' });
            return;
        }
        navigator.geolocation.getCurrentPosition(
            (p) => resolve({ status: 'located', lat: p.coords.latitude, lng: p.coords.longitude }),
            (e) => resolve({ status: e.code === 1 ? 'denied' : e.code === 3 ? 'timeout' : 'unavailable' }),
            { enableHighAccuracy: highAccuracy, timeout: timeoutMs, maximumAge: maximumAgeMs },
        );
    });
}
")]
extern "C" {
    fn gis_locate(high_accuracy: bool, timeout_ms: f64, maximum_age_ms: f64) -> js_sys::Promise;
}

fn field(obj: &JsValue, name: &str) -> JsValue {
    js_sys::Reflect::get(obj, &JsValue::from_str(name)).unwrap_or(JsValue::UNDEFINED)
}

/// `navigator.geolocation`, one shot, no watching.
pub struct BrowserGeolocation;

impl GeolocationProvider for BrowserGeolocation {
    async fn locate(&self, options: &GeolocationOptions) -> GeolocationOutcome {
        let promise = gis_locate(
            options.high_accuracy,
            options.timeout.as_millis() as f64,
            options.maximum_age.as_millis() as f64,
        );
        let Ok(result) = JsFuture::from(promise).await else {
            return GeolocationOutcome::Unavailable;
        };
        match field(&result, "status").as_string().as_deref() {
            Some("located") => match (field(&result, "lng").as_f64(), field(&result, "lat").as_f64()) {
                (Some(lng), Some(lat)) => GeolocationOutcome::Located(LngLat::new(lng, lat)),
                _ => GeolocationOutcome::Unavailable,
            },
            Some("unsupported") => GeolocationOutcome::Unsupported,
            Some("denied") => GeolocationOutcome::Denied,
            Some("timeout") => GeolocationOutcome::TimedOut,
            _ => GeolocationOutcome::Unavailable,
        }
    }
}
