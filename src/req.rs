use anyhow::{Context, Result};
use std::collections::HashMap;
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::{constants::MAX_BODY_BYTES, error::CustomError};

#[derive(Debug, PartialEq, Eq)]
pub enum Method {
    GET,
    POST,
    PUT,
    DELETE,
}

impl TryFrom<&str> for Method {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, anyhow::Error> {
        match value {
            "GET" => Ok(Method::GET),
            "POST" => Ok(Method::POST),
            "PUT" => Ok(Method::PUT),
            "DELETE" => Ok(Method::DELETE),
            _ => Err(anyhow::anyhow!("Method not supported")),
        }
    }
}

pub struct Request {
    pub method: Method,
    pub path: String,
    pub query: HashMap<String, String>,
    pub headers: HashMap<String, String>,
    pub body: String,
}

impl Request {
    /// Reads one request off the stream: the head up to the blank line, then
    /// exactly `Content-Length` bytes of body.
    pub async fn new<Reader>(mut reader: Reader) -> Result<Self>
    where
        Reader: AsyncRead + Unpin,
    {
        let mut buffer = Vec::with_capacity(1024);
        let mut chunk = [0u8; 1024];

        let head_end = loop {
            if let Some(pos) = find_head_end(&buffer) {
                break pos;
            }
            if buffer.len() > MAX_BODY_BYTES {
                return Err(CustomError::BodyTooLarge.into());
            }
            let size = reader.read(&mut chunk).await.context("Failed to read stream")?;
            if size == 0 {
                anyhow::bail!("Connection closed before end of headers");
            }
            buffer.extend_from_slice(&chunk[..size]);
        };

        let head = String::from_utf8_lossy(&buffer[..head_end]).into_owned();
        let mut body = buffer.split_off(head_end + 4);

        let content_length = head
            .lines()
            .filter_map(|line| line.split_once(':'))
            .find(|(k, _)| k.trim().eq_ignore_ascii_case("content-length"))
            .map(|(_, v)| v.trim().parse::<usize>())
            .transpose()
            .context("Invalid Content-Length")?
            .unwrap_or(0);

        if content_length > MAX_BODY_BYTES {
            return Err(CustomError::BodyTooLarge.into());
        }
        while body.len() < content_length {
            let size = reader.read(&mut chunk).await.context("Failed to read body")?;
            if size == 0 {
                anyhow::bail!("Connection closed before end of body");
            }
            body.extend_from_slice(&chunk[..size]);
        }
        body.truncate(content_length);

        let body = String::from_utf8(body).context("Body is not UTF-8")?;
        Self::parse(&head, body)
    }

    pub fn parse(head: &str, body: String) -> Result<Self> {
        // Method and path
        let mut head_line = head.lines();
        let first = head_line.next().context("Empty Request")?;
        let mut request_parts = first.split_whitespace();
        let method: Method = request_parts
            .next()
            .ok_or(anyhow::anyhow!("missing method"))
            .and_then(TryInto::try_into)
            .context("Missing Method")?;
        let target = request_parts.next().context("No Path")?;
        let (path, query) = match target.split_once('?') {
            Some((path, raw)) => (path, parse_query(raw)),
            None => (target, HashMap::new()),
        };

        // Headers
        let mut headers = HashMap::new();
        for line in head_line {
            if let Some((k, v)) = line.split_once(':') {
                headers.insert(k.trim().to_lowercase(), v.trim().to_string());
            }
        }
        Ok(Request {
            method,
            path: path.into(),
            query,
            headers,
            body,
        })
    }
}

fn find_head_end(buffer: &[u8]) -> Option<usize> {
    buffer.windows(4).position(|w| w == b"\r\n\r\n")
}

fn parse_query(raw: &str) -> HashMap<String, String> {
    raw.split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (k, v) = pair.split_once('=').unwrap_or((pair, ""));
            (decode(k), decode(v))
        })
        .collect()
}

fn decode(value: &str) -> String {
    let spaced = value.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(|v| v.into_owned())
        .unwrap_or(spaced)
}
