//! HTTP side resources of the agent: initial model info and the
//! obstruction map image. Both are opaque to the chart pipeline.

use anyhow::Context;
use url::Url;

use crate::error::DashError;
use crate::types::InitialData;

/// `ws://host:port/ws` -> `http://host:port/`
pub fn http_base(ws_url: &str) -> Result<Url, DashError> {
    let mut url = Url::parse(ws_url)
        .map_err(|e| DashError::TransportUnavailable(format!("bad url '{ws_url}': {e}")))?;
    let scheme = match url.scheme() {
        "ws" | "http" => "http",
        "wss" | "https" => "https",
        other => {
            return Err(DashError::TransportUnavailable(format!(
                "unsupported scheme '{other}'"
            )))
        }
    };
    url.set_scheme(scheme)
        .map_err(|_| DashError::TransportUnavailable(format!("cannot rewrite '{ws_url}'")))?;
    url.set_path("/");
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}

pub fn initial_data_url(base: &Url) -> Result<Url, url::ParseError> {
    base.join("get_inital_data")
}

/// The query is only a cache buster (milliseconds since epoch).
pub fn obstruction_map_url(base: &Url, buster: i64) -> Result<Url, url::ParseError> {
    let mut url = base.join("obstruction_map_image")?;
    url.set_query(Some(&buster.to_string()));
    Ok(url)
}

pub async fn fetch_initial_data(client: &reqwest::Client, base: &Url) -> anyhow::Result<InitialData> {
    let url = initial_data_url(base)?;
    let data = client
        .get(url.clone())
        .send()
        .await
        .and_then(|r| r.error_for_status())
        .with_context(|| format!("GET {url}"))?
        .json::<InitialData>()
        .await
        .context("decode initial data")?;
    Ok(data)
}

pub async fn fetch_obstruction_map(
    client: &reqwest::Client,
    base: &Url,
    buster: i64,
) -> anyhow::Result<Vec<u8>> {
    let url = obstruction_map_url(base, buster)?;
    let bytes = client
        .get(url.clone())
        .send()
        .await
        .and_then(|r| r.error_for_status())
        .with_context(|| format!("GET {url}"))?
        .bytes()
        .await
        .context("read obstruction map")?;
    Ok(bytes.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_follows_socket_scheme_and_authority() {
        assert_eq!(
            http_base("ws://192.168.100.1:3000/ws").unwrap().as_str(),
            "http://192.168.100.1:3000/"
        );
        assert_eq!(
            http_base("wss://dish.example/ws?x=1").unwrap().as_str(),
            "https://dish.example/"
        );
        assert!(http_base("ftp://x/ws").is_err());
        assert!(http_base("not a url").is_err());
    }

    #[test]
    fn resource_urls() {
        let base = http_base("ws://host:3000/ws").unwrap();
        assert_eq!(
            initial_data_url(&base).unwrap().as_str(),
            "http://host:3000/get_inital_data"
        );
        assert_eq!(
            obstruction_map_url(&base, 1700000000123).unwrap().as_str(),
            "http://host:3000/obstruction_map_image?1700000000123"
        );
    }
}
