pub mod skeletonfile;
