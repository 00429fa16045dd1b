pub mod lnrpc;
