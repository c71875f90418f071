//! Giardino delle Voci entry point
//!
//! Native: runs the garden headless and prints events as JSON lines.
//! Web: exposes a `Garden` handle the page drives from its frame loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_garden {
    use wasm_bindgen::prelude::*;

    use giardino::consts::SIM_DT;
    use giardino::{Config, parse_seed};

    fn js_error(e: impl std::fmt::Display) -> JsValue {
        js_sys::Error::new(&e.to_string()).into()
    }

    fn now_ms() -> Option<f64> {
        web_sys::window()
            .and_then(|w| w.performance())
            .map(|p| p.now())
    }

    /// Garden handle for the page
    #[wasm_bindgen(js_name = Garden)]
    pub struct GardenHandle {
        inner: giardino::Garden,
        last_frame: Option<f64>,
    }

    #[wasm_bindgen(js_class = Garden)]
    impl GardenHandle {
        /// Seed text is coerced the same way as on the command line; a
        /// preset name is applied on top of the JSON config
        #[wasm_bindgen(constructor)]
        pub fn new(
            seed: &str,
            config_json: Option<String>,
            preset: Option<String>,
        ) -> Result<GardenHandle, JsValue> {
            let config =
                Config::load(config_json.as_deref(), preset.as_deref()).map_err(js_error)?;
            Ok(Self {
                inner: giardino::Garden::new(config, parse_seed(seed)),
                last_frame: None,
            })
        }

        /// Feed `elapsed_ms` of wall-clock time; returns sub-steps run
        pub fn advance(&mut self, elapsed_ms: f64) -> Result<u32, JsValue> {
            self.inner
                .advance((elapsed_ms / 1000.0) as f32, SIM_DT)
                .map_err(js_error)
        }

        /// Advance by the time since the previous call, read from `performance.now()`
        pub fn frame(&mut self) -> Result<u32, JsValue> {
            let Some(now) = now_ms() else {
                return Ok(0);
            };
            let elapsed = self.last_frame.map_or(0.0, |last| now - last);
            self.last_frame = Some(now);
            self.advance(elapsed)
        }

        pub fn snapshot_json(&self) -> Result<String, JsValue> {
            self.inner.snapshot().to_json().map_err(js_error)
        }

        /// Drained events as a JSON array
        pub fn events_json(&mut self) -> Result<String, JsValue> {
            serde_json::to_string(&self.inner.drain_events()).map_err(js_error)
        }

        pub fn reset(&mut self) {
            self.inner.reset();
            self.last_frame = None;
        }

        pub fn reseed(&mut self, seed: &str) {
            self.inner.reseed(parse_seed(seed));
            self.last_frame = None;
        }

        pub fn seed(&self) -> String {
            self.inner.seed().to_string()
        }
    }

    pub fn init() {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(log::Level::Info).is_err() {
            web_sys::console::warn_1(&"Logger already set".into());
        }
        log::info!("Giardino delle Voci starting...");
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_garden::init();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let seed = args.next().map_or(0, |s| giardino::parse_seed(&s));
    let seconds = args
        .next()
        .and_then(|s| s.parse::<f32>().ok())
        .filter(|s| s.is_finite() && *s >= 0.0)
        .unwrap_or(60.0);

    if let Err(e) = run_headless(seed, seconds) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn run_headless(seed: u64, seconds: f32) -> giardino::Result<()> {
    use giardino::consts::SIM_DT;
    use giardino::{Config, Garden};
    use std::io::Write;

    let text = match std::env::var("GIARDINO_CONFIG") {
        Ok(path) => {
            log::info!("Loading config from {}", path);
            Some(std::fs::read_to_string(&path)?)
        }
        Err(_) => None,
    };
    let preset = std::env::var("GIARDINO_PRESET").ok();
    let config = Config::load(text.as_deref(), preset.as_deref())?;

    let mut garden = Garden::new(config, seed);
    let ticks = (seconds / SIM_DT).round() as u64;
    log::info!("Running seed {} for {:.1}s ({} ticks)", seed, seconds, ticks);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for _ in 0..ticks {
        garden.step()?;
        for event in garden.drain_events() {
            writeln!(out, "{}", serde_json::to_string(&event)?)?;
        }
    }

    let world = garden.world();
    for agent in &world.agents {
        log::info!("{:?} carried {:?}", agent.id, agent.carried);
    }
    Ok(())
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
