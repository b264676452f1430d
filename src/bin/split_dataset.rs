use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    splitters::example_apps::run_split_dataset(std::env::args().skip(1))
}
