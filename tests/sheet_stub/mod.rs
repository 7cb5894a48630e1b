use std::sync::mpsc;
use std::thread;
use std::time::Duration;

/// Sheet with two readable chapters (stored out of order) and one row without content.
pub const SHEET_CSV: &str = "name,date,writer,data\r\n\
\"Second\",1921,Writer 2,\"Body two\"\r\n\
First,1920,1,\"# Opening\nPara with **bold** and *it*\n{{image:lotus.png|A lotus}}\nTranslator's Note\nA note\"\r\n\
Skipped,,Writer 0,\r\n";

pub const GOOD_GID: &str = "111";

/// Local stand-in for the spreadsheet CSV export.
///
/// `/export?format=csv&gid=111` serves [`SHEET_CSV`]; any other gid answers 500.
pub struct SheetStub {
    pub base_url: String,
    shutdown_tx: Option<mpsc::Sender<()>>,
    handle: Option<thread::JoinHandle<()>>,
}

impl SheetStub {
    pub fn spawn() -> Self {
        let server = tiny_http::Server::http("127.0.0.1:0").expect("start sheet stub server");
        let addr = server.server_addr();
        let base_url = format!("http://{addr}/export?format=csv");

        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();

        let handle = thread::spawn(move || {
            loop {
                if shutdown_rx.try_recv().is_ok() {
                    break;
                }

                let request = match server.recv_timeout(Duration::from_millis(50)) {
                    Ok(Some(req)) => req,
                    Ok(None) => continue,
                    Err(_) => break,
                };

                let url = request.url().to_string();
                let (path, query) = url.split_once('?').unwrap_or((url.as_str(), ""));
                let gid = query
                    .split('&')
                    .find_map(|pair| pair.strip_prefix("gid="))
                    .unwrap_or("");

                let response = if path == "/export" && gid == GOOD_GID {
                    tiny_http::Response::from_string(SHEET_CSV).with_header(
                        "Content-Type: text/csv; charset=utf-8"
                            .parse::<tiny_http::Header>()
                            .expect("valid header"),
                    )
                } else {
                    tiny_http::Response::from_string("sheet unavailable").with_status_code(500)
                };
                let _ = request.respond(response);
            }
        });

        Self {
            base_url,
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
        }
    }
}

impl Drop for SheetStub {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
