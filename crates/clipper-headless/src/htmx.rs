//! HTMX dynamic-content loader (§4.1.1). Runs against a live page
//! after navigation: detects same-origin HTMX endpoints, issues their
//! subresource fetches itself (the browser never makes these calls),
//! injects the returned fragments, exercises non-`load` triggers, and
//! waits for DOM quiescence before a lazy-load scroll pass.

use chromiumoxide::Page;
use clipper_types::{ClipperError, Result};
use serde::Deserialize;
use std::time::Duration;

const MAX_CLICKED_TRIGGERS: usize = 10;
const QUIESCENCE_TIMEOUT: Duration = Duration::from_secs(10);
const MIN_LINKS_BEFORE_RETRY: usize = 20;

#[derive(Debug, Deserialize)]
struct HtmxEndpoint {
    method: String,
    url: String,
}

#[derive(Debug, Deserialize, Default)]
struct HtmxProbe {
    endpoints: Vec<HtmxEndpoint>,
    csrf_token: Option<String>,
    has_htmx_markers: bool,
}

/// True when the page's rendered DOM exhibits HTMX markers: a global
/// `window.htmx`, `hx-get`/`hx-post`/`data-hx-*` attributes, or a
/// script tag whose `src` contains "htmx".
const DETECT_MARKERS_JS: &str = r#"
(() => {
  const hasGlobal = typeof window.htmx !== 'undefined';
  const hasAttrs = document.querySelector('[hx-get],[hx-post],[data-hx-get],[data-hx-post]') !== null;
  const hasScript = Array.from(document.scripts).some(s => (s.src || '').includes('htmx'));
  const endpoints = [];
  document.querySelectorAll('[hx-get],[data-hx-get]').forEach(el => {
    const url = el.getAttribute('hx-get') || el.getAttribute('data-hx-get');
    if (url) endpoints.push({ method: 'GET', url });
  });
  document.querySelectorAll('[hx-post],[data-hx-post]').forEach(el => {
    const url = el.getAttribute('hx-post') || el.getAttribute('data-hx-post');
    if (url) endpoints.push({ method: 'POST', url });
  });
  const csrfMeta = document.querySelector('meta[name="csrf-token"]');
  const csrfInput = document.querySelector('input[name="_token"]');
  const csrf_token = csrfMeta ? csrfMeta.getAttribute('content') : (csrfInput ? csrfInput.value : null);
  return { endpoints, csrf_token, has_htmx_markers: hasGlobal || hasAttrs || hasScript };
})()
"#;

pub async fn detect_and_probe(page: &Page, client: &reqwest::Client) -> Result<bool> {
    let probe: HtmxProbe = evaluate_json(page, DETECT_MARKERS_JS).await?;
    if !probe.has_htmx_markers {
        return Ok(false);
    }
    enrich(page, client, &probe).await?;
    Ok(true)
}

async fn enrich(page: &Page, client: &reqwest::Client, probe: &HtmxProbe) -> Result<()> {
    let current_url: String = evaluate_json(page, "window.location.href").await.unwrap_or_default();

    for endpoint in &probe.endpoints {
        let mut request = match endpoint.method.as_str() {
            "POST" => client.post(&endpoint.url),
            _ => client.get(&endpoint.url),
        };
        request = request
            .header("HX-Request", "true")
            .header("HX-Current-URL", current_url.clone());
        if let Some(token) = &probe.csrf_token {
            request = request.header("X-CSRF-Token", token.clone());
        }

        let fragment = match request.send().await {
            Ok(resp) => resp.text().await.unwrap_or_default(),
            Err(e) => {
                tracing::warn!(error = %e, url = %endpoint.url, "htmx subresource fetch failed");
                continue;
            }
        };

        inject_fragment(page, &fragment).await?;
    }

    click_non_load_triggers(page).await?;
    wait_for_quiescence(page).await;
    lazy_load_scroll(page).await?;

    if count_link_candidates(page).await.unwrap_or(0) < MIN_LINKS_BEFORE_RETRY {
        // §4.1.1: "If fewer than 20 link candidates are present after
        // these steps, repeat once."
        click_non_load_triggers(page).await?;
        wait_for_quiescence(page).await;
        lazy_load_scroll(page).await?;
    }

    Ok(())
}

async fn inject_fragment(page: &Page, fragment: &str) -> Result<()> {
    let escaped = serde_json::to_string(fragment).unwrap_or_else(|_| "\"\"".to_string());
    let script = format!(
        r#"(() => {{
  const div = document.createElement('div');
  div.className = 'htmx-injected';
  div.innerHTML = {escaped};
  document.body.appendChild(div);
}})()"#
    );
    run_void(page, &script).await
}

async fn click_non_load_triggers(page: &Page) -> Result<()> {
    let script = format!(
        r#"(() => {{
  const nodes = Array.from(document.querySelectorAll('[hx-trigger],[data-hx-trigger]'))
    .filter(el => {{
      const trigger = (el.getAttribute('hx-trigger') || el.getAttribute('data-hx-trigger') || '').toLowerCase();
      const url = (el.getAttribute('hx-get') || el.getAttribute('hx-post') || el.getAttribute('data-hx-get') || el.getAttribute('data-hx-post') || '').toLowerCase();
      return trigger && trigger !== 'load' && !url.includes('search') && !url.includes('filter');
    }})
    .slice(0, {MAX_CLICKED_TRIGGERS});
  nodes.forEach(el => {{ try {{ el.click(); }} catch (e) {{}} }});
}})()"#
    );
    run_void(page, &script).await
}

async fn wait_for_quiescence(page: &Page) {
    let deadline = tokio::time::Instant::now() + QUIESCENCE_TIMEOUT;
    loop {
        let busy: bool = evaluate_json(
            page,
            "document.querySelector('.loading,.spinner,[data-loading=true],.skeleton') !== null",
        )
        .await
        .unwrap_or(false);
        if !busy || tokio::time::Instant::now() >= deadline {
            return;
        }
        tokio::time::sleep(Duration::from_millis(200)).await;
    }
}

async fn lazy_load_scroll(page: &Page) -> Result<()> {
    for fraction in ["1/3", "2/3", "1"] {
        let script = format!(
            "window.scrollTo(0, document.body.scrollHeight * ({fraction}));"
        );
        run_void(page, &script).await?;
        tokio::time::sleep(Duration::from_secs(1)).await;
    }
    Ok(())
}

async fn count_link_candidates(page: &Page) -> Result<usize> {
    evaluate_json(
        page,
        "document.querySelectorAll('a[href], [hx-get], [hx-post], [data-hx-get], [data-hx-post]').length",
    )
    .await
}

async fn run_void(page: &Page, script: &str) -> Result<()> {
    page.evaluate(script)
        .await
        .map_err(|e| ClipperError::Headless(format!("htmx loader script failed: {e}")))?;
    Ok(())
}

async fn evaluate_json<T: for<'de> Deserialize<'de> + Default>(page: &Page, script: &str) -> Result<T> {
    let result = page
        .evaluate(script)
        .await
        .map_err(|e| ClipperError::Headless(format!("page evaluation failed: {e}")))?;
    result
        .into_value()
        .map_err(|e| ClipperError::Headless(format!("could not decode evaluation result: {e}")))
}
