pub mod compact;
pub mod connection_graph;
pub mod wire_link;
