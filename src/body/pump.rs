use super::{Body, IntoChunk};
use crate::error::Result;
use crate::log::{trace, warning};
use crate::response::Responder;

/// Drive a body through the response bridge.
///
/// Empty chunks are skipped, so leading empty chunks never flush the head.
/// Consumption stops as soon as the declared length is reached. If the body
/// produced no data, an empty write still flushes the head.
///
/// [`Body::close`] is called exactly once before returning, including when
/// consumption fails or panics. A failure from consumption takes precedence
/// over a failure from closing.
///
/// # Errors
///
/// Returns any error of [`Responder::write`], or the failure produced by the
/// body.
pub fn pump<B: Body>(responder: &mut Responder<'_>, body: B) -> Result<()> {
    let mut guard = CloseGuard { body, closed: false };

    let result = drive(responder, &mut guard.body);
    let closed = guard.close();

    result?;
    closed.map_err(Into::into)
}

fn drive<B: Body>(responder: &mut Responder<'_>, body: &mut B) -> Result<()> {
    while let Some(chunk) = body.next_chunk() {
        let data = chunk?.into_chunk()?;

        if !data.is_empty() {
            responder.write(data)?;
        }

        if responder.is_complete() {
            trace!("declared length reached, body consumption stopped");
            break;
        }
    }

    if !responder.is_flushed() {
        responder.write(bytes::Bytes::new())?;
    }

    Ok(())
}

/// Closes the body on drop if it was not closed explicitly.
struct CloseGuard<B: Body> {
    body: B,
    closed: bool,
}

impl<B: Body> CloseGuard<B> {
    fn close(&mut self) -> Result<(), crate::error::Failure> {
        self.closed = true;
        self.body.close()
    }
}

impl<B: Body> Drop for CloseGuard<B> {
    fn drop(&mut self) {
        if !self.closed {
            if let Err(err) = self.close() {
                warning!("failed to close body while unwinding: {err}");
            }
        }
    }
}
