mod clones;
