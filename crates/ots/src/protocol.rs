// SPDX-License-Identifier: Apache-2.0

//! Request signing and response verification for the OTS HTTP API.
//!
//! Every request is a `POST` of a protobuf body to `<endpoint>/<Operation>`,
//! authenticated by an HMAC-SHA1 signature over the canonical `x-ots-*`
//! header block. Responses are checked for integrity (MD5), freshness
//! ([`MAX_CLOCK_SKEW`]) and authenticity before their body is handed on.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, NaiveDateTime, Utc};
use hmac::{Hmac, Mac};
use md5::{Digest, Md5};
use sha1::Sha1;
use tracing::{debug, warn};

use crate::decoder::decode_service_error;
use crate::error::{Error, Result};

pub const HEADER_DATE: &str = "x-ots-date";
pub const HEADER_API_VERSION: &str = "x-ots-apiversion";
pub const HEADER_ACCESS_ID: &str = "x-ots-accessid";
pub const HEADER_INSTANCE_NAME: &str = "x-ots-instancename";
pub const HEADER_CONTENT_MD5: &str = "x-ots-contentmd5";
pub const HEADER_SIGNATURE: &str = "x-ots-signature";
pub const HEADER_REQUEST_ID: &str = "x-ots-requestid";
pub const HEADER_CONTENT_TYPE: &str = "x-ots-contenttype";
pub const HEADER_AUTHORIZATION: &str = "authorization";

pub const OTS_HEADER_PREFIX: &str = "x-ots-";
pub const API_VERSION: &str = "2014-08-08";
pub const CONTENT_TYPE_PROTOBUF: &str = "protocol buffer";

/// Fixed-width RFC 1123 date, always rendered in UTC.
pub const DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

pub const MAX_CLOCK_SKEW: Duration = Duration::from_secs(15 * 60);

/// Error code the service uses when it rejects a request signature.
pub const AUTH_FAILED_CODE: &str = "OTSAuthFailed";

const REQUIRED_RESPONSE_HEADERS: [&str; 4] = [
    HEADER_DATE,
    HEADER_CONTENT_MD5,
    HEADER_REQUEST_ID,
    HEADER_CONTENT_TYPE,
];

type HmacSha1 = Hmac<Sha1>;

/// The operations the service accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Operation {
    CreateTable,
    ListTable,
    DeleteTable,
    DescribeTable,
    UpdateTable,
    GetRow,
    PutRow,
    UpdateRow,
    DeleteRow,
    BatchGetRow,
    BatchWriteRow,
    GetRange,
}

impl Operation {
    pub const ALL: [Operation; 12] = [
        Operation::CreateTable,
        Operation::ListTable,
        Operation::DeleteTable,
        Operation::DescribeTable,
        Operation::UpdateTable,
        Operation::GetRow,
        Operation::PutRow,
        Operation::UpdateRow,
        Operation::DeleteRow,
        Operation::BatchGetRow,
        Operation::BatchWriteRow,
        Operation::GetRange,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Operation::CreateTable => "CreateTable",
            Operation::ListTable => "ListTable",
            Operation::DeleteTable => "DeleteTable",
            Operation::DescribeTable => "DescribeTable",
            Operation::UpdateTable => "UpdateTable",
            Operation::GetRow => "GetRow",
            Operation::PutRow => "PutRow",
            Operation::UpdateRow => "UpdateRow",
            Operation::DeleteRow => "DeleteRow",
            Operation::BatchGetRow => "BatchGetRow",
            Operation::BatchWriteRow => "BatchWriteRow",
            Operation::GetRange => "GetRange",
        }
    }

    /// Looks up an operation by its exact, case-sensitive API name.
    pub fn parse(name: &str) -> Result<Self> {
        Operation::ALL
            .into_iter()
            .find(|op| op.as_str() == name)
            .ok_or_else(|| Error::UnsupportedOperation(name.to_string()))
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Operation::parse(s)
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub endpoint: String,
    pub access_key_id: String,
    pub access_key_secret: String,
    pub instance_name: String,
}

impl Credentials {
    pub fn new(
        endpoint: impl Into<String>,
        access_key_id: impl Into<String>,
        access_key_secret: impl Into<String>,
        instance_name: impl Into<String>,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            access_key_id: access_key_id.into(),
            access_key_secret: access_key_secret.into(),
            instance_name: instance_name.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("endpoint", &self.endpoint)
            .field("access_key_id", &self.access_key_id)
            .field("access_key_secret", &"<redacted>")
            .field("instance_name", &self.instance_name)
            .finish()
    }
}

/// Source of the current instant used for request dates and freshness checks.
pub trait Clock: Send + Sync + fmt::Debug {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub DateTime<Utc>);

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(now)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// An outgoing request ready to hand to a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedRequest {
    pub operation: Operation,
    pub url: String,
    pub headers: BTreeMap<String, String>,
    pub body: Vec<u8>,
}

/// A response as received from the transport.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawResponse {
    pub status: u16,
    /// Header names are lower-case when built through [`RawResponse::new`].
    pub headers: BTreeMap<String, String>,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn new<I, K, V>(status: u16, headers: I, body: Vec<u8>) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        Self {
            status,
            headers: headers
                .into_iter()
                .map(|(k, v)| (k.as_ref().to_ascii_lowercase(), v.into()))
                .collect(),
            body,
        }
    }

    /// Looks a header up by name, ignoring ASCII case.
    pub fn header(&self, name: &str) -> Option<&str> {
        lookup_header(&self.headers, name)
    }

    pub fn request_id(&self) -> &str {
        self.header(HEADER_REQUEST_ID).unwrap_or_default()
    }
}

fn lookup_header<'a>(headers: &'a BTreeMap<String, String>, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .or_else(|| {
            headers
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(name))
                .map(|(_, value)| value)
        })
        .map(String::as_str)
}

/// Renders the canonical header block both signatures are computed over.
///
/// Only `x-ots-*` headers take part, minus the signature header itself.
/// Names are lower-cased, values trimmed, and the `name:value` lines are
/// sorted and joined with `\n`.
pub fn header_string<I, K, V>(headers: I) -> String
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut lines: Vec<String> = headers
        .into_iter()
        .filter_map(|(name, value)| {
            let name = name.as_ref().to_ascii_lowercase();
            if !name.starts_with(OTS_HEADER_PREFIX) || name == HEADER_SIGNATURE {
                return None;
            }
            Some(format!("{name}:{}", value.as_ref().trim()))
        })
        .collect();
    lines.sort();
    lines.join("\n")
}

pub fn request_signature<I, K, V>(secret: &str, operation: Operation, headers: I) -> Result<String>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let string_to_sign = format!(
        "/{}\nPOST\n\n{}\n",
        operation.as_str(),
        header_string(headers)
    );
    hmac_sha1_base64(secret, &string_to_sign)
}

/// The response string puts the header block first and the operation path
/// last, the reverse of the request string.
pub fn response_signature<I, K, V>(
    secret: &str,
    operation: Operation,
    headers: I,
) -> Result<String>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let string_to_sign = format!("{}\n/{}", header_string(headers), operation.as_str());
    hmac_sha1_base64(secret, &string_to_sign)
}

fn hmac_sha1_base64(secret: &str, message: &str) -> Result<String> {
    let mut mac = HmacSha1::new_from_slice(secret.as_bytes())
        .map_err(|err| Error::invalid_input(format!("hmac key: {err}")))?;
    mac.update(message.as_bytes());
    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}

/// Base64 of the MD5 digest of `body`.
pub fn content_md5(body: &[u8]) -> String {
    STANDARD.encode(Md5::digest(body))
}

pub fn format_date(at: DateTime<Utc>) -> String {
    at.format(DATE_FORMAT).to_string()
}

pub fn parse_date(value: &str) -> Result<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(value.trim(), DATE_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|err| Error::malformed(format!("invalid date format in response: {err}")))
}

/// Signs requests and verifies responses for one set of credentials.
#[derive(Debug, Clone)]
pub struct Protocol {
    credentials: Credentials,
    clock: Arc<dyn Clock>,
}

impl Protocol {
    pub fn new(credentials: Credentials) -> Self {
        Self::with_clock(credentials, Arc::new(SystemClock))
    }

    pub fn with_clock(credentials: Credentials, clock: Arc<dyn Clock>) -> Self {
        Self { credentials, clock }
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    fn endpoint(&self, operation: Operation) -> String {
        format!(
            "{}/{}",
            self.credentials.endpoint.trim_end_matches('/'),
            operation.as_str()
        )
    }

    pub fn sign_request(&self, operation: &str, body: Vec<u8>) -> Result<SignedRequest> {
        let operation = Operation::parse(operation)?;

        let mut headers = BTreeMap::new();
        headers.insert(HEADER_DATE.to_string(), format_date(self.clock.now()));
        headers.insert(HEADER_API_VERSION.to_string(), API_VERSION.to_string());
        headers.insert(
            HEADER_INSTANCE_NAME.to_string(),
            self.credentials.instance_name.clone(),
        );
        headers.insert(HEADER_CONTENT_MD5.to_string(), content_md5(&body));
        headers.insert(
            HEADER_ACCESS_ID.to_string(),
            self.credentials.access_key_id.clone(),
        );

        let signature =
            request_signature(&self.credentials.access_key_secret, operation, &headers)?;
        headers.insert(HEADER_SIGNATURE.to_string(), signature);

        let url = self.endpoint(operation);
        debug!(operation = %operation, url = %url, size = body.len(), "ots_request_signed");
        Ok(SignedRequest {
            operation,
            url,
            headers,
            body,
        })
    }

    /// Checks a response and returns `Ok(())` when its body may be decoded
    /// as the operation's response message.
    ///
    /// Non-2xx responses that pass the integrity checks surface as
    /// [`Error::Service`], or as [`Error::UndecodableErrorBody`] when the
    /// body is not an error record.
    pub fn verify_response(&self, operation: &str, response: &RawResponse) -> Result<()> {
        let operation = Operation::parse(operation)?;
        let request_id = response.request_id();

        for name in REQUIRED_RESPONSE_HEADERS {
            if response.header(name).is_none() {
                warn!(operation = %operation, header = name, "ots_response_header_missing");
                return Err(Error::malformed(format!(
                    "\"{name}\" is missing in response header"
                )));
            }
        }

        let expected_md5 = content_md5(&response.body);
        if response.header(HEADER_CONTENT_MD5).map(str::trim) != Some(expected_md5.as_str()) {
            warn!(operation = %operation, request_id = %request_id, "ots_response_md5_mismatch");
            return Err(Error::ChecksumMismatch);
        }

        let server_time = parse_date(response.header(HEADER_DATE).unwrap_or_default())?;
        self.check_freshness(operation, server_time)?;

        if response.status != 403 {
            self.check_authorization(operation, &response.headers)?;
        }

        if (200..300).contains(&response.status) {
            debug!(operation = %operation, status = response.status, request_id = %request_id, "ots_response_verified");
            return Ok(());
        }

        let record = match decode_service_error(&response.body) {
            Ok(record) => record,
            Err(err) => {
                if response.status == 403 {
                    self.check_authorization(operation, &response.headers)?;
                }
                warn!(
                    operation = %operation,
                    status = response.status,
                    request_id = %request_id,
                    error = %err,
                    "ots_error_body_undecodable"
                );
                return Err(Error::UndecodableErrorBody {
                    status: response.status,
                    detail: err.to_string(),
                });
            }
        };
        let (code, message) = (record.code, record.message);

        if response.status == 403 && code != AUTH_FAILED_CODE {
            self.check_authorization(operation, &response.headers)?;
        }

        debug!(
            operation = %operation,
            status = response.status,
            request_id = %request_id,
            code = %code,
            "ots_service_error"
        );
        Err(Error::service(response.status, code, message, request_id))
    }

    fn check_freshness(&self, operation: Operation, server_time: DateTime<Utc>) -> Result<()> {
        let skew = self.clock.now().signed_duration_since(server_time);
        if u128::from(skew.num_milliseconds().unsigned_abs()) > MAX_CLOCK_SKEW.as_millis() {
            warn!(
                operation = %operation,
                skew_seconds = skew.num_seconds(),
                "ots_response_clock_skew"
            );
            return Err(Error::ClockSkewExceeded {
                skew_seconds: skew.num_seconds(),
            });
        }
        Ok(())
    }

    fn check_authorization(
        &self,
        operation: Operation,
        headers: &BTreeMap<String, String>,
    ) -> Result<()> {
        let result = self.authorization_matches(operation, headers);
        if let Err(err) = &result {
            warn!(operation = %operation, error = %err, "ots_response_authorization_failed");
        }
        result
    }

    fn authorization_matches(
        &self,
        operation: Operation,
        headers: &BTreeMap<String, String>,
    ) -> Result<()> {
        let value = lookup_header(headers, HEADER_AUTHORIZATION).ok_or_else(|| {
            Error::InvalidAuthorization(format!(
                "\"{HEADER_AUTHORIZATION}\" is missing in response header"
            ))
        })?;
        let credential = value
            .trim()
            .strip_prefix("OTS ")
            .ok_or_else(|| Error::InvalidAuthorization("scheme is not OTS".to_string()))?;
        let (access_id, signature) = credential.split_once(':').ok_or_else(|| {
            Error::InvalidAuthorization("expected \"OTS <access id>:<signature>\"".to_string())
        })?;
        if access_id != self.credentials.access_key_id {
            return Err(Error::InvalidAuthorization(
                "access key id mismatch".to_string(),
            ));
        }
        let expected = response_signature(&self.credentials.access_key_secret, operation, headers)?;
        if signature != expected {
            return Err(Error::InvalidAuthorization("signature mismatch".to_string()));
        }
        Ok(())
    }

    /// The `authorization` value a service attaches to a response carrying
    /// `headers`.
    pub fn sign_response(
        &self,
        operation: &str,
        headers: &BTreeMap<String, String>,
    ) -> Result<String> {
        let operation = Operation::parse(operation)?;
        let signature = response_signature(&self.credentials.access_key_secret, operation, headers)?;
        Ok(format!("OTS {}:{}", self.credentials.access_key_id, signature))
    }

    /// Builds the full header set of a signed response for `body`.
    pub fn response_headers(
        &self,
        operation: &str,
        request_id: &str,
        body: &[u8],
    ) -> Result<BTreeMap<String, String>> {
        let mut headers = BTreeMap::new();
        headers.insert(HEADER_DATE.to_string(), format_date(self.clock.now()));
        headers.insert(HEADER_CONTENT_MD5.to_string(), content_md5(body));
        headers.insert(HEADER_REQUEST_ID.to_string(), request_id.to_string());
        headers.insert(
            HEADER_CONTENT_TYPE.to_string(),
            CONTENT_TYPE_PROTOBUF.to_string(),
        );
        let authorization = self.sign_response(operation, &headers)?;
        headers.insert(HEADER_AUTHORIZATION.to_string(), authorization);
        Ok(headers)
    }

    /// Server-side check of an incoming request: access id, body checksum and
    /// signature. Returns the operation named by the request.
    pub fn verify_request(
        &self,
        operation: &str,
        headers: &BTreeMap<String, String>,
        body: &[u8],
    ) -> Result<Operation> {
        let operation = Operation::parse(operation)?;
        let header = |name: &str| {
            headers
                .get(name)
                .map(|v| v.trim())
                .ok_or_else(|| Error::InvalidAuthorization(format!("\"{name}\" is missing")))
        };

        if header(HEADER_ACCESS_ID)? != self.credentials.access_key_id {
            return Err(Error::InvalidAuthorization(
                "access key id mismatch".to_string(),
            ));
        }
        if header(HEADER_CONTENT_MD5)? != content_md5(body) {
            return Err(Error::ChecksumMismatch);
        }
        let expected = request_signature(&self.credentials.access_key_secret, operation, headers)?;
        if header(HEADER_SIGNATURE)? != expected {
            return Err(Error::InvalidAuthorization("signature mismatch".to_string()));
        }
        Ok(operation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::encode_body;
    use crate::test_util::{decode_hex, load_fixture};
    use crate::wire;
    use chrono::TimeZone;

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2014, 8, 8, 12, 0, 0).unwrap()
    }

    fn credentials() -> Credentials {
        Credentials::new("http://127.0.0.1:8800/", "AK", "SK", "sample")
    }

    fn protocol_at(now: DateTime<Utc>) -> Protocol {
        Protocol::with_clock(credentials(), Arc::new(FixedClock::new(now)))
    }

    fn signed_response(signer: &Protocol, operation: &str, status: u16, body: Vec<u8>) -> RawResponse {
        let headers = signer.response_headers(operation, "req-1", &body).unwrap();
        RawResponse::new(status, headers, body)
    }

    #[test]
    fn header_string_filters_and_sorts() {
        let headers = [
            ("X-OTS-Date", "  Fri, 08 Aug 2014 12:00:00 GMT "),
            ("Content-Type", "application/octet-stream"),
            ("x-ots-signature", "ignored"),
            ("x-ots-apiversion", "2014-08-08"),
            ("x-otsbogus", "dropped"),
            ("x-ots-accessid", "AK"),
        ];
        assert_eq!(
            header_string(headers),
            "x-ots-accessid:AK\nx-ots-apiversion:2014-08-08\nx-ots-date:Fri, 08 Aug 2014 12:00:00 GMT"
        );
        assert_eq!(header_string(Vec::<(String, String)>::new()), "");
    }

    #[test]
    fn dates_are_fixed_width_gmt() {
        assert_eq!(format_date(noon()), "Fri, 08 Aug 2014 12:00:00 GMT");
        assert_eq!(parse_date("Fri, 08 Aug 2014 12:00:00 GMT").unwrap(), noon());
        assert!(matches!(
            parse_date("2014-08-08T12:00:00Z"),
            Err(Error::MalformedResponse(_))
        ));
    }

    #[test]
    fn put_row_request_signature_is_deterministic() {
        let fixture = load_fixture("put_row_sample");
        let signed = protocol_at(noon())
            .sign_request(&fixture.operation, decode_hex(&fixture.payload_hex))
            .unwrap();

        assert_eq!(signed.url, "http://127.0.0.1:8800/PutRow");
        assert_eq!(signed.headers[HEADER_DATE], "Fri, 08 Aug 2014 12:00:00 GMT");
        assert_eq!(signed.headers[HEADER_API_VERSION], API_VERSION);
        assert_eq!(signed.headers[HEADER_INSTANCE_NAME], "sample");
        assert_eq!(signed.headers[HEADER_ACCESS_ID], "AK");
        assert_eq!(signed.headers[HEADER_CONTENT_MD5], "8aNnDoTzz/PSehz6FwXi5g==");
        assert_eq!(signed.headers[HEADER_SIGNATURE], "pudv+RmklYwOQAyTk3kUmfP2nPE=");
    }

    #[test]
    fn put_row_response_signature_is_deterministic() {
        let body = decode_hex(&load_fixture("put_row_response").payload_hex);
        let headers = protocol_at(noon())
            .response_headers("PutRow", "req-1", &body)
            .unwrap();
        assert_eq!(headers[HEADER_CONTENT_MD5], "bofsTfsxtvymDNQpw96K/Q==");
        assert_eq!(
            headers[HEADER_AUTHORIZATION],
            "OTS AK:ENJJgCHopO+0Xs6z9ybi4XnwXTo="
        );
    }

    #[test]
    fn signed_requests_verify_and_mutations_fail() {
        let protocol = protocol_at(noon());
        let signed = protocol.sign_request("GetRow", b"payload".to_vec()).unwrap();
        assert_eq!(
            protocol
                .verify_request("GetRow", &signed.headers, &signed.body)
                .unwrap(),
            Operation::GetRow
        );

        let mut tampered = signed.headers.clone();
        tampered.insert(HEADER_INSTANCE_NAME.into(), "other".into());
        assert!(matches!(
            protocol.verify_request("GetRow", &tampered, &signed.body),
            Err(Error::InvalidAuthorization(_))
        ));
        assert!(matches!(
            protocol.verify_request("GetRow", &signed.headers, b"payloaD"),
            Err(Error::ChecksumMismatch)
        ));
        assert!(protocol
            .verify_request("PutRow", &signed.headers, &signed.body)
            .is_err());
    }

    #[test]
    fn signed_responses_verify_and_mutations_fail() {
        let protocol = protocol_at(noon());
        let response = signed_response(&protocol, "PutRow", 200, b"body".to_vec());
        protocol.verify_response("PutRow", &response).unwrap();

        let mut tampered = response.clone();
        tampered
            .headers
            .insert(HEADER_REQUEST_ID.into(), "req-2".into());
        assert!(matches!(
            protocol.verify_response("PutRow", &tampered),
            Err(Error::InvalidAuthorization(_))
        ));

        let mut wrong_id = response.clone();
        let auth = wrong_id.headers[HEADER_AUTHORIZATION].replacen("AK", "AX", 1);
        wrong_id.headers.insert(HEADER_AUTHORIZATION.into(), auth);
        assert!(matches!(
            protocol.verify_response("PutRow", &wrong_id),
            Err(Error::InvalidAuthorization(_))
        ));

        let mut body = response.clone();
        body.body = b"bodY".to_vec();
        assert!(matches!(
            protocol.verify_response("PutRow", &body),
            Err(Error::ChecksumMismatch)
        ));

        // Signed for a different operation.
        assert!(matches!(
            protocol.verify_response("GetRow", &response),
            Err(Error::InvalidAuthorization(_))
        ));
    }

    #[test]
    fn missing_headers_are_malformed() {
        let protocol = protocol_at(noon());
        for name in REQUIRED_RESPONSE_HEADERS {
            let mut response = signed_response(&protocol, "ListTable", 200, Vec::new());
            response.headers.remove(name);
            let err = protocol.verify_response("ListTable", &response).unwrap_err();
            assert!(matches!(err, Error::MalformedResponse(msg) if msg.contains(name)));
        }
    }

    #[test]
    fn freshness_window_is_fifteen_minutes() {
        let signer = protocol_at(noon());
        let response = signed_response(&signer, "ListTable", 200, Vec::new());

        for offset in [-(14 * 60 + 59), 14 * 60 + 59, 15 * 60, -15 * 60] {
            let verifier = protocol_at(noon() + chrono::Duration::seconds(offset));
            verifier.verify_response("ListTable", &response).unwrap();
        }
        for offset in [15 * 60 + 1, -(15 * 60 + 1)] {
            let verifier = protocol_at(noon() + chrono::Duration::seconds(offset));
            assert!(matches!(
                verifier.verify_response("ListTable", &response),
                Err(Error::ClockSkewExceeded { .. })
            ));
        }
    }

    #[test]
    fn unknown_operations_are_rejected() {
        let protocol = protocol_at(noon());
        assert!(matches!(
            protocol.sign_request("DropTable", Vec::new()),
            Err(Error::UnsupportedOperation(op)) if op == "DropTable"
        ));
        assert!(matches!(
            protocol.verify_response("DropTable", &RawResponse::default()),
            Err(Error::UnsupportedOperation(_))
        ));
        assert!(Operation::parse("putrow").is_err());
        for op in Operation::ALL {
            assert_eq!(op.as_str().parse::<Operation>().unwrap(), op);
        }
    }

    #[test]
    fn service_errors_surface_after_verification() {
        let protocol = protocol_at(noon());
        let body = encode_body(&wire::Error {
            code: "OTSObjectNotExist".into(),
            message: Some("Requested table does not exist.".into()),
        });
        let response = signed_response(&protocol, "DescribeTable", 404, body);
        let err = protocol
            .verify_response("DescribeTable", &response)
            .unwrap_err();
        assert!(err.is_service_error("OTSObjectNotExist"));
        assert_eq!(err.status(), Some(404));
        match err {
            Error::Service(service) => {
                assert_eq!(service.message, "Requested table does not exist.");
                assert_eq!(service.request_id, "req-1");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn auth_failed_responses_skip_the_signature_check() {
        let protocol = protocol_at(noon());
        let body = encode_body(&wire::Error {
            code: AUTH_FAILED_CODE.into(),
            message: Some("Signature mismatch.".into()),
        });
        let mut response = signed_response(&protocol, "PutRow", 403, body);
        response.headers.remove(HEADER_AUTHORIZATION);
        let err = protocol.verify_response("PutRow", &response).unwrap_err();
        assert!(err.is_service_error(AUTH_FAILED_CODE));
    }

    #[test]
    fn other_forbidden_responses_still_need_a_valid_signature() {
        let protocol = protocol_at(noon());
        let body = encode_body(&wire::Error {
            code: "OTSPermissionDenied".into(),
            message: None,
        });
        let mut response = signed_response(&protocol, "PutRow", 403, body);
        let err = protocol.verify_response("PutRow", &response).unwrap_err();
        assert!(err.is_service_error("OTSPermissionDenied"));

        response.headers.remove(HEADER_AUTHORIZATION);
        assert!(matches!(
            protocol.verify_response("PutRow", &response),
            Err(Error::InvalidAuthorization(_))
        ));
    }

    #[test]
    fn undecodable_error_bodies_report_the_status() {
        let protocol = protocol_at(noon());
        let response = signed_response(&protocol, "GetRow", 500, vec![0x0a, 0xff]);
        let err = protocol.verify_response("GetRow", &response).unwrap_err();
        assert!(err.is_client_error());
        assert_eq!(err.status(), Some(500));
        assert!(matches!(
            err,
            Error::UndecodableErrorBody { status: 500, .. }
        ));
    }

    #[test]
    fn undecodable_forbidden_bodies_still_check_authorization() {
        let protocol = protocol_at(noon());
        let mut response = signed_response(&protocol, "GetRow", 403, vec![0x0a, 0xff]);
        assert!(matches!(
            protocol.verify_response("GetRow", &response),
            Err(Error::UndecodableErrorBody { status: 403, .. })
        ));

        response.headers.remove(HEADER_AUTHORIZATION);
        assert!(matches!(
            protocol.verify_response("GetRow", &response),
            Err(Error::InvalidAuthorization(_))
        ));
    }

    #[test]
    fn mixed_case_header_names_are_found() {
        let protocol = protocol_at(noon());
        let signed = signed_response(&protocol, "GetRow", 200, b"ok".to_vec());
        let response = RawResponse {
            status: 200,
            headers: signed
                .headers
                .iter()
                .map(|(name, value)| (name.to_ascii_uppercase(), value.clone()))
                .collect(),
            body: signed.body.clone(),
        };
        assert_eq!(response.header("x-ots-requestid"), Some("req-1"));
        assert_eq!(response.request_id(), "req-1");
        protocol.verify_response("GetRow", &response).unwrap();
    }

    #[test]
    fn credentials_debug_redacts_the_secret() {
        let rendered = format!("{:?}", credentials());
        assert!(rendered.contains("AK"));
        assert!(!rendered.contains("\"SK\""));
    }
}
