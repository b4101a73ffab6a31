//! In-process fake Redis speaking just enough RESP2 for the session store

#![allow(dead_code)]

use bytes::BytesMut;
use parking_lot::Mutex;
use resp_session_store::resp::parse;
use resp_session_store::RespValue;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

const DATABASES: u32 = 16;

#[derive(Default)]
struct State {
    password: Option<String>,
    /// (db, key) -> (value, ttl seconds)
    keys: HashMap<(u32, String), (String, i64)>,
    /// Commands received, one list per accepted connection
    connections: Vec<Vec<Vec<String>>>,
}

/// Fake server handle; the accept loop runs until the test runtime shuts down
#[derive(Clone)]
pub struct FakeRedis {
    addr: SocketAddr,
    state: Arc<Mutex<State>>,
    write_chunk: Option<usize>,
}

impl FakeRedis {
    pub async fn start() -> Self {
        Self::start_with(None, None).await
    }

    pub async fn with_password(password: &str) -> Self {
        Self::start_with(Some(password.to_string()), None).await
    }

    /// Replies are written in pieces of `chunk` bytes, flushed separately
    pub async fn with_write_chunk(chunk: usize) -> Self {
        Self::start_with(None, Some(chunk)).await
    }

    async fn start_with(password: Option<String>, write_chunk: Option<usize>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = FakeRedis {
            addr,
            state: Arc::new(Mutex::new(State {
                password,
                ..Default::default()
            })),
            write_chunk,
        };

        let accept = server.clone();
        tokio::spawn(async move {
            while let Ok((socket, _)) = listener.accept().await {
                let conn = accept.clone();
                let index = {
                    let mut state = conn.state.lock();
                    state.connections.push(Vec::new());
                    state.connections.len() - 1
                };
                tokio::spawn(async move { conn.serve(socket, index).await });
            }
        });

        server
    }

    /// `redis://` URL for this server, with optional user-info and path
    pub fn url(&self, auth: &str, db: &str) -> String {
        format!("redis://{}{}/{}", auth, self.addr, db)
    }

    pub fn connections(&self) -> Vec<Vec<Vec<String>>> {
        self.state.lock().connections.clone()
    }

    pub fn value(&self, db: u32, key: &str) -> Option<(String, i64)> {
        self.state.lock().keys.get(&(db, key.to_string())).cloned()
    }

    pub fn insert(&self, db: u32, key: &str, value: &str, ttl: i64) {
        self.state
            .lock()
            .keys
            .insert((db, key.to_string()), (value.to_string(), ttl));
    }

    async fn serve(self, mut socket: TcpStream, index: usize) {
        let mut buf = BytesMut::with_capacity(4096);
        let mut cursor = 0;
        let mut db = 0u32;
        let mut authed = self.state.lock().password.is_none();

        loop {
            while let Ok(Some((value, next))) = parse(&buf, cursor) {
                cursor = next;
                let args = match value {
                    RespValue::Array(Some(items)) => items
                        .into_iter()
                        .filter_map(|item| item.into_bulk().ok().flatten())
                        .collect::<Vec<_>>(),
                    _ => return,
                };
                self.state.lock().connections[index].push(args.clone());

                let reply = self.apply(&args, &mut db, &mut authed).encode();
                if self.write(&mut socket, &reply).await.is_err() {
                    return;
                }
            }

            match socket.read_buf(&mut buf).await {
                Ok(0) | Err(_) => return,
                Ok(_) => {}
            }
        }
    }

    async fn write(&self, socket: &mut TcpStream, reply: &[u8]) -> std::io::Result<()> {
        match self.write_chunk {
            None => socket.write_all(reply).await?,
            Some(size) => {
                for piece in reply.chunks(size) {
                    socket.write_all(piece).await?;
                    socket.flush().await?;
                    tokio::task::yield_now().await;
                }
            }
        }
        socket.flush().await
    }

    fn apply(&self, args: &[String], db: &mut u32, authed: &mut bool) -> RespValue {
        let ok = || RespValue::SimpleString("OK".to_string());
        let err = |msg: &str| RespValue::Error(msg.to_string());
        let mut state = self.state.lock();

        if args.is_empty() {
            return err("ERR empty command");
        }
        let name = args.first().map(|s| s.to_ascii_uppercase()).unwrap_or_default();
        if name == "AUTH" {
            return match (&state.password, args.get(1)) {
                (None, _) => err("ERR AUTH <password> called without any password configured for the default user."),
                (Some(expected), Some(given)) if expected == given => {
                    *authed = true;
                    ok()
                }
                _ => err("WRONGPASS invalid username-password pair or user is disabled."),
            };
        }
        if !*authed {
            return err("NOAUTH Authentication required.");
        }

        match (name.as_str(), &args[1..]) {
            ("SELECT", [index]) => match index.parse::<u32>() {
                Ok(n) if n < DATABASES => {
                    *db = n;
                    ok()
                }
                _ => err("ERR DB index is out of range"),
            },
            ("GET", [key]) => RespValue::BulkString(
                state.keys.get(&(*db, key.clone())).map(|(v, _)| v.clone()),
            ),
            ("SETEX", [key, ttl, value]) => match ttl.parse::<i64>() {
                Ok(ttl) if ttl > 0 => {
                    state.keys.insert((*db, key.clone()), (value.clone(), ttl));
                    ok()
                }
                _ => err("ERR invalid expire time in 'setex' command"),
            },
            ("DEL", [key]) => {
                RespValue::Integer(state.keys.remove(&(*db, key.clone())).is_some() as i64)
            }
            ("EXPIRE", [key, ttl]) => match (state.keys.get_mut(&(*db, key.clone())), ttl.parse::<i64>()) {
                (_, Err(_)) => err("ERR value is not an integer or out of range"),
                (Some(entry), Ok(ttl)) => {
                    entry.1 = ttl;
                    RespValue::Integer(1)
                }
                (None, Ok(_)) => RespValue::Integer(0),
            },
            _ => err(&format!("ERR unknown command '{}'", name)),
        }
    }
}
