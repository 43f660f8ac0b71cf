use axum::http::StatusCode;
use bytes::Bytes;

use super::error::BodyError;

/// Origin classification of a fetched response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseKind {
    /// Same-origin response with a readable body.
    Basic,
    /// Cross-origin response obtained with CORS.
    Cors,
    /// Cross-origin response whose body is not readable.
    Opaque,
}

/// Single-consumption response body.
///
/// The buffer can be read exactly once. A consumer that needs to both
/// return and persist a response must call [`ResponseBody::duplicate`]
/// before the first read (duplicate-before-consume).
#[derive(Debug)]
pub struct ResponseBody {
    bytes: Option<Bytes>,
}

impl ResponseBody {
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Self {
            bytes: Some(bytes.into()),
        }
    }

    /// Take the buffer. Fails if it was already consumed.
    pub fn consume(&mut self) -> Result<Bytes, BodyError> {
        self.bytes.take().ok_or(BodyError::AlreadyConsumed)
    }

    /// Copy the unread buffer into a fresh body.
    pub fn duplicate(&self) -> Result<Self, BodyError> {
        match &self.bytes {
            Some(bytes) => Ok(Self {
                bytes: Some(bytes.clone()),
            }),
            None => Err(BodyError::AlreadyConsumed),
        }
    }

    pub fn is_consumed(&self) -> bool {
        self.bytes.is_none()
    }

    /// Unread length, if the body has not been consumed yet.
    pub fn len(&self) -> Option<usize> {
        self.bytes.as_ref().map(Bytes::len)
    }
}

/// A response flowing through the worker.
#[derive(Debug)]
pub struct WorkerResponse {
    status: StatusCode,
    kind: ResponseKind,
    headers: Vec<(String, String)>,
    body: ResponseBody,
}

impl WorkerResponse {
    pub fn new(
        status: StatusCode,
        kind: ResponseKind,
        headers: Vec<(String, String)>,
        body: impl Into<Bytes>,
    ) -> Self {
        Self {
            status,
            kind,
            headers,
            body: ResponseBody::new(body),
        }
    }

    /// A response synthesized by the worker itself, with no origin
    /// involved.
    pub fn synthetic(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self::new(status, ResponseKind::Basic, Vec::new(), body)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn kind(&self) -> ResponseKind {
        self.kind
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn body(&self) -> &ResponseBody {
        &self.body
    }

    /// Whether the interceptor may store this response: a 200
    /// same-origin response.
    pub fn is_storable(&self) -> bool {
        self.status == StatusCode::OK && self.kind == ResponseKind::Basic
    }

    /// Duplicate the whole response before its body is consumed.
    pub fn duplicate(&self) -> Result<Self, BodyError> {
        Ok(Self {
            status: self.status,
            kind: self.kind,
            headers: self.headers.clone(),
            body: self.body.duplicate()?,
        })
    }

    /// Consume the response into its transport parts.
    pub fn into_parts(mut self) -> Result<(StatusCode, Vec<(String, String)>, Bytes), BodyError> {
        let bytes = self.body.consume()?;
        Ok((self.status, self.headers, bytes))
    }
}
