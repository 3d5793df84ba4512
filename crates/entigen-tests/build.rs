fn main() {
    entigen::build!("schema.toml");
}
