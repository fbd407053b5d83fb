use std::{env, fs, io};

use studiomodel::prelude::*;

pub fn main() -> io::Result<()> {
    env_logger::init();

    let Some(path) = env::args().nth(1) else {
        return Err(io::Error::other("usage: vtx_readout <file.vtx>"));
    };
    let data = fs::read(&path)?;

    let mut trace = LogTrace;
    let vtx = Decoder::new()
        .with_trace(&mut trace)
        .decode(&data)
        .map_err(io::Error::other)?;

    let h = vtx.header;
    println!(
        "{path}: version {} vert cache {} bones per strip {} per tri {} per vert {} lods {}",
        h.version,
        h.vert_cache_size,
        h.max_bones_per_strip,
        h.max_bones_per_tri,
        h.max_bones_per_vert,
        h.num_lods
    );
    println!("{:#?}", vtx.stats());

    for (p, part) in vtx.body_parts.iter().enumerate() {
        for (m, model) in part.models.iter().enumerate() {
            for (l, lod) in model.lods.iter().enumerate() {
                let tris: usize = lod
                    .meshes
                    .iter()
                    .flat_map(|mesh| &mesh.strip_groups)
                    .map(|group| group.triangles().len())
                    .sum();
                println!(
                    "body part {p} model {m} lod {l}: switch {} meshes {} triangles {tris}",
                    lod.switch_point,
                    lod.meshes.len()
                );
            }
        }
    }

    Ok(())
}
