use std::io::{Cursor, Read};

use reqwest::blocking::Client;
use tracing::debug;

use crate::error::{Error, Result};
use crate::hash::ObjectId;
use crate::transport::pkt::{pkt_line, read_pkt_line, FLUSH_PKT};

const UPLOAD_PACK_SERVICE: &str = "git-upload-pack";
/// negotiation response preamble when the server has nothing in common
const NAK_LINE: &[u8] = b"0008NAK\n";

/// discover the remote tip via the info/refs advertisement
pub fn discover_tip(client: &Client, url: &str) -> Result<ObjectId> {
    let refs_url = format!(
        "{}/info/refs?service={}",
        url.trim_end_matches('/'),
        UPLOAD_PACK_SERVICE
    );

    let body = client
        .get(&refs_url)
        .send()?
        .error_for_status()?
        .bytes()?;

    let tip = parse_advertisement(&mut Cursor::new(body.as_ref()))?;
    debug!(%tip, url = refs_url, "discovered remote tip");

    Ok(tip)
}

/// fetch the packfile for a tip with a plain want/done negotiation
///
/// returns the raw packfile bytes with the leading NAK pkt-line stripped.
pub fn fetch_pack(client: &Client, url: &str, tip: &ObjectId) -> Result<Vec<u8>> {
    let pack_url = format!("{}/{}", url.trim_end_matches('/'), UPLOAD_PACK_SERVICE);

    let body = client
        .post(&pack_url)
        .header("Content-Type", "application/x-git-upload-pack-request")
        .body(build_fetch_request(tip))
        .send()?
        .error_for_status()?
        .bytes()?;

    let pack = strip_nak(body.as_ref())?;
    debug!(bytes = pack.len(), url = pack_url, "fetched packfile");

    Ok(pack.to_vec())
}

/// parse the ref advertisement stream down to the tip id
///
/// the stream opens with a service announcement pkt-line and a flush; the
/// next pkt-line is `<40hex> HEAD\0<capabilities>`. everything after the tip
/// id (other refs, capabilities) is irrelevant to a baseline clone.
pub fn parse_advertisement<R: Read>(reader: &mut R) -> Result<ObjectId> {
    match read_pkt_line(reader)? {
        Some(_) => {} // "# service=git-upload-pack"
        None => {
            return Err(Error::MalformedAdvertisement(
                "flush before service announcement".to_string(),
            ))
        }
    }

    if read_pkt_line(reader)?.is_some() {
        return Err(Error::MalformedAdvertisement(
            "missing flush after service announcement".to_string(),
        ));
    }

    let head_line = read_pkt_line(reader)?.ok_or_else(|| {
        Error::MalformedAdvertisement("stream ended before head line".to_string())
    })?;

    let token = head_line
        .split(|&b| b == b' ')
        .next()
        .unwrap_or(&head_line);
    let token = std::str::from_utf8(token)
        .map_err(|_| Error::MalformedAdvertisement("head line not utf-8".to_string()))?;

    if token.len() != 40 {
        return Err(Error::MalformedAdvertisement(format!(
            "first token is not a 40-hex id: {token:?}"
        )));
    }

    ObjectId::from_hex(token)
        .map_err(|_| Error::MalformedAdvertisement(format!("first token is not hex: {token:?}")))
}

/// request body for the upload-pack POST: want, flush, done
pub fn build_fetch_request(tip: &ObjectId) -> Vec<u8> {
    let mut body = pkt_line(&format!("want {} no-progress\n", tip.to_hex()));
    body.extend_from_slice(FLUSH_PKT);
    body.extend_from_slice(&pkt_line("done\n"));
    body
}

/// verify and strip the NAK pkt-line in front of the packfile
fn strip_nak(body: &[u8]) -> Result<&[u8]> {
    match body.get(..NAK_LINE.len()) {
        Some(prefix) if prefix == NAK_LINE => Ok(&body[NAK_LINE.len()..]),
        _ => Err(Error::MalformedPktLine(
            "upload-pack response does not start with NAK".to_string(),
        )),
    }
}
