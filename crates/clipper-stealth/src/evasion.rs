//! Ties the user-agent rotator and fingerprint generator together and
//! renders the page-context init script injected before navigation
//! (§4.1.3).

use crate::fingerprint::FingerprintProfile;
use crate::user_agent::UserAgentRotator;
use std::collections::HashMap;

pub struct StealthController {
    rotator: UserAgentRotator,
}

impl StealthController {
    pub fn new() -> Self {
        Self {
            rotator: UserAgentRotator::new(),
        }
    }

    /// Pick the user agent and matching header set for a request.
    pub fn next_headers(&self) -> HashMap<String, String> {
        let ua = self.rotator.next();
        self.rotator.headers_for(ua)
    }

    /// Build a fresh fingerprint profile matched to `user_agent`'s
    /// platform, and the script that should be evaluated in the page
    /// before navigation to apply it.
    pub fn prepare_page(&self, user_agent: &str) -> (FingerprintProfile, String) {
        let platform = UserAgentRotator::platform_for(user_agent).navigator_platform();
        let profile = FingerprintProfile::generate(platform);
        let script = render_init_script(&profile);
        (profile, script)
    }
}

impl Default for StealthController {
    fn default() -> Self {
        Self::new()
    }
}

/// Renders the page-context JS override bundle: screen/viewport,
/// WebGL vendor/renderer, canvas noise, audio jitter, navigator
/// overrides, WebRTC relay-only policy, permissions, timezone, and a
/// Turnstile instrumentation wrapper that records widget lifecycle
/// events into page-scope storage for later inspection.
pub fn render_init_script(profile: &FingerprintProfile) -> String {
    format!(
        r#"(() => {{
  Object.defineProperty(navigator, 'webdriver', {{ get: () => undefined }});
  Object.defineProperty(navigator, 'hardwareConcurrency', {{ get: () => {hw} }});
  Object.defineProperty(navigator, 'deviceMemory', {{ get: () => {mem} }});
  Object.defineProperty(navigator, 'platform', {{ get: () => '{platform}' }});
  Object.defineProperty(screen, 'width', {{ get: () => {width} }});
  Object.defineProperty(screen, 'height', {{ get: () => {height} }});

  const getParameterProxy = WebGLRenderingContext.prototype.getParameter;
  WebGLRenderingContext.prototype.getParameter = function (parameter) {{
    if (parameter === 37445) return '{webgl_vendor}';
    if (parameter === 37446) return '{webgl_renderer}';
    return getParameterProxy.call(this, parameter);
  }};

  const toDataURLProxy = HTMLCanvasElement.prototype.toDataURL;
  HTMLCanvasElement.prototype.toDataURL = function (...args) {{
    const ctx = this.getContext('2d');
    if (ctx) {{
      const data = ctx.getImageData(0, 0, this.width, this.height);
      for (let i = 0; i < data.data.length; i += 4) {{
        data.data[i] += (Math.random() - 0.5) * {canvas_noise};
      }}
      ctx.putImageData(data, 0, 0);
    }}
    return toDataURLProxy.apply(this, args);
  }};

  const origCreateOscillator = AudioContext.prototype.createOscillator;
  AudioContext.prototype.createOscillator = function () {{
    const osc = origCreateOscillator.call(this);
    const origFreq = osc.frequency.value;
    osc.frequency.value = origFreq + (Math.random() * {audio_noise});
    return osc;
  }};

  const origRTCPeerConnection = window.RTCPeerConnection;
  if (origRTCPeerConnection) {{
    window.RTCPeerConnection = function (config, ...rest) {{
      config = config || {{}};
      config.iceTransportPolicy = 'relay';
      return new origRTCPeerConnection(config, ...rest);
    }};
  }}

  const origQuery = navigator.permissions && navigator.permissions.query;
  if (origQuery) {{
    navigator.permissions.query = (params) => {{
      if (params && (params.name === 'notifications' || params.name === 'geolocation')) {{
        return Promise.resolve({{ state: 'prompt' }});
      }}
      return origQuery(params);
    }};
  }}

  try {{
    const origResolvedOptions = Intl.DateTimeFormat.prototype.resolvedOptions;
    Intl.DateTimeFormat.prototype.resolvedOptions = function (...args) {{
      const options = origResolvedOptions.apply(this, args);
      options.timeZone = '{timezone}';
      return options;
    }};
  }} catch (e) {{}}

  window.__clipperTurnstile = window.__clipperTurnstile || {{ widgets: [], tokens: [], errors: [] }};
  const installTurnstileHooks = () => {{
    if (!window.turnstile || window.turnstile.__clipperWrapped) return;
    const store = window.__clipperTurnstile;
    const origRender = window.turnstile.render;
    const origExecute = window.turnstile.execute;
    const origGetResponse = window.turnstile.getResponse;
    window.turnstile.render = function (container, params) {{
      const id = origRender.call(this, container, params);
      store.widgets.push({{ id, container: String(container) }});
      return id;
    }};
    window.turnstile.execute = function (...args) {{
      const result = origExecute ? origExecute.apply(this, args) : undefined;
      store.tokens.push({{ at: Date.now() }});
      return result;
    }};
    window.turnstile.getResponse = function (...args) {{
      const token = origGetResponse ? origGetResponse.apply(this, args) : undefined;
      if (token) store.tokens.push({{ token, at: Date.now() }});
      return token;
    }};
    window.turnstile.__clipperWrapped = true;
  }};
  installTurnstileHooks();
  const turnstilePoll = setInterval(() => {{
    installTurnstileHooks();
    if (window.turnstile && window.turnstile.__clipperWrapped) clearInterval(turnstilePoll);
  }}, 250);
}})();"#,
        hw = profile.navigator.hardware_concurrency,
        mem = profile.navigator.device_memory,
        platform = profile.navigator.platform,
        width = profile.screen.width,
        height = profile.screen.height,
        webgl_vendor = profile.webgl.vendor,
        webgl_renderer = profile.webgl.renderer,
        canvas_noise = profile.canvas_noise,
        audio_noise = profile.audio_noise,
        timezone = profile.timezone,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_script_contains_all_required_overrides() {
        let profile = FingerprintProfile::generate("Win32");
        let script = render_init_script(&profile);
        assert!(script.contains("navigator, 'webdriver'"));
        assert!(script.contains("iceTransportPolicy = 'relay'"));
        assert!(script.contains("getParameter"));
        assert!(script.contains("__clipperTurnstile"));
        assert!(script.contains("state: 'prompt'"));
    }

    #[test]
    fn controller_headers_and_profile_are_consistent_platform() {
        let controller = StealthController::new();
        let headers = controller.next_headers();
        let ua = headers.get("User-Agent").unwrap().clone();
        let (profile, script) = controller.prepare_page(&ua);
        assert!(script.contains(&profile.navigator.platform));
    }
}
