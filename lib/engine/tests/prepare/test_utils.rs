use rdf_prepare_model::NamedNode;

pub fn iri(local: &str) -> NamedNode {
    NamedNode::new_unchecked(format!("http://example.com/{local}"))
}
