//! Prover worker entry point

fn main() {
    if let Err(err) = web::worker::serve() {
        web_sys::console::error_1(&err);
    }
}
