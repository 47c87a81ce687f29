//! TCP front end.
//!
//! A listener hands accepted connections to a bounded pool of worker
//! threads over a channel. One worker serves one connection at a time,
//! so requests on a connection are answered in arrival order while
//! independent connections run in parallel. Handlers run to completion
//! once a frame is fully read; a peer that disconnects early only loses
//! the reply. The LMK registry is shared read-only across workers.

mod frame;

pub use frame::{frame, read_frame, write_frame, MAX_FRAME_LEN};

use std::io;
use std::net::{TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;

use crossbeam_channel::{bounded, Receiver, Sender};

use crate::command::dispatch;
use crate::lmk::LmkRegistry;

/// Default number of worker threads.
pub const DEFAULT_WORKERS: usize = 4;

/// The HSM TCP server.
pub struct Server {
    registry: Arc<LmkRegistry>,
    workers: usize,
}

impl Server {
    pub fn new(registry: Arc<LmkRegistry>, workers: usize) -> Self {
        Server {
            registry,
            workers: workers.max(1),
        }
    }

    /// Accept connections forever, dispatching them to the worker
    /// pool. Returns only when the listener fails.
    pub fn serve(&self, listener: TcpListener) -> io::Result<()> {
        log::info!(
            "listening on {} with {} workers",
            listener.local_addr()?,
            self.workers
        );

        let (tx, rx): (Sender<TcpStream>, Receiver<TcpStream>) = bounded(self.workers * 2);

        let mut handles = Vec::with_capacity(self.workers);
        for worker_id in 0..self.workers {
            let rx = rx.clone();
            let registry = Arc::clone(&self.registry);
            handles.push(thread::spawn(move || {
                for stream in rx.iter() {
                    if let Err(e) = serve_connection(stream, &registry) {
                        log::warn!("worker {}: connection ended with error: {}", worker_id, e);
                    }
                }
            }));
        }

        for stream in listener.incoming() {
            match stream {
                Ok(stream) => {
                    if let Ok(peer) = stream.peer_addr() {
                        log::debug!("accepted connection from {}", peer);
                    }
                    if tx.send(stream).is_err() {
                        break;
                    }
                }
                Err(e) => log::warn!("accept failed: {}", e),
            }
        }

        drop(tx);
        for handle in handles {
            let _ = handle.join();
        }
        Ok(())
    }
}

/// Serve one connection until the peer closes it.
fn serve_connection(mut stream: TcpStream, registry: &LmkRegistry) -> io::Result<()> {
    loop {
        let request = match read_frame(&mut stream)? {
            Some(body) => body,
            None => return Ok(()),
        };

        // The command runs to completion regardless of the peer; a
        // failed write only discards the reply.
        let response = dispatch(&request, registry);
        if let Err(e) = write_frame(&mut stream, &response) {
            log::debug!("reply discarded: {}", e);
            return Ok(());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_registry;
    use std::io::{Read, Write};
    use std::net::TcpStream;

    #[test]
    fn test_server_answers_framed_requests_in_order() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let server = Server::new(Arc::new(test_registry()), 2);
        thread::spawn(move || {
            let _ = server.serve(listener);
        });

        let mut stream = TcpStream::connect(addr).unwrap();
        write_frame(&mut stream, b"B20004TEST").unwrap();
        write_frame(&mut stream, b"B20002OK").unwrap();

        let first = read_frame(&mut stream).unwrap().unwrap();
        assert_eq!(first, b"B300TEST");
        let second = read_frame(&mut stream).unwrap().unwrap();
        assert_eq!(second, b"B300OK");

        // Unknown commands still produce a framed error reply.
        write_frame(&mut stream, b"ZZ").unwrap();
        let third = read_frame(&mut stream).unwrap().unwrap();
        assert_eq!(third, b"Z[68");

        drop(stream);

        // The pool keeps serving new connections afterwards.
        let mut stream = TcpStream::connect(addr).unwrap();
        stream.write_all(&frame(b"NC0007-E000").unwrap()).unwrap();
        let mut reply = vec![0u8; 2];
        stream.read_exact(&mut reply).unwrap();
        let len = u16::from_be_bytes([reply[0], reply[1]]) as usize;
        let mut body = vec![0u8; len];
        stream.read_exact(&mut body).unwrap();
        assert_eq!(&body[..4], b"ND00");
    }
}
