use gallery_room::GalleryConfig;

fn main() -> anyhow::Result<()> {
    gallery_room::run(GalleryConfig::default())
}
